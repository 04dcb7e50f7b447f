//! In-memory snapshot of a content repository.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),

    #[error("Failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    IgnorePattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Ordered mapping from repository-relative path to file content.
///
/// Paths always use `/` separators. Iteration is in path order, which keeps
/// every pass over the snapshot deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSnapshot {
    files: BTreeMap<String, String>,
}

impl FileSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(normalize_path(&path.into()), content.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|s| s.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Load every markdown and JSON file under `root`.
    ///
    /// Hidden files and directories are skipped, as are relative paths
    /// matching any of `ignore_patterns`. Unreadable files are logged and
    /// skipped.
    pub fn from_dir(root: &Path, ignore_patterns: &[String]) -> Result<Self, SnapshotError> {
        if !root.is_dir() {
            return Err(SnapshotError::MissingRoot(root.to_path_buf()));
        }

        let ignores = ignore_patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| SnapshotError::IgnorePattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut snapshot = FileSnapshot::new();
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let is_content = matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("md") | Some("json")
            );
            if !is_content {
                continue;
            }

            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");
            if ignores.iter().any(|re| re.is_match(&rel)) {
                tracing::debug!("Ignoring {} due to ignore_patterns", rel);
                continue;
            }

            match fs::read_to_string(path) {
                Ok(content) => snapshot.insert(rel, content),
                Err(err) => tracing::warn!("Skipping unreadable file {:?}: {}", path, err),
            }
        }

        tracing::info!("Loaded {} content files from {:?}", snapshot.len(), root);
        Ok(snapshot)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut snapshot = FileSnapshot::new();
        for (path, content) in iter {
            snapshot.insert(path, content);
        }
        snapshot
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").trim_start_matches("./").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_from_iter_normalizes_paths() {
        let snapshot: FileSnapshot = [("./modules\\intro.md", "x")].into_iter().collect();
        assert!(snapshot.contains("modules/intro.md"));
    }

    #[test]
    fn test_iteration_is_path_ordered() {
        let snapshot: FileSnapshot = [("b.md", ""), ("a.md", ""), ("c/a.md", "")]
            .into_iter()
            .collect();
        let paths: Vec<_> = snapshot.paths().collect();
        assert_eq!(paths, vec!["a.md", "b.md", "c/a.md"]);
    }

    #[test]
    fn test_from_dir_skips_hidden_and_ignored() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("modules")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::create_dir_all(root.join("drafts")).unwrap();
        fs::write(root.join("modules/intro.md"), "# Page: Hi").unwrap();
        fs::write(root.join("modules/notes.txt"), "skip").unwrap();
        fs::write(root.join(".git/config.md"), "skip").unwrap();
        fs::write(root.join("drafts/wip.md"), "skip").unwrap();

        let snapshot = FileSnapshot::from_dir(root, &["^drafts/".to_string()]).unwrap();
        let paths: Vec<_> = snapshot.paths().collect();
        assert_eq!(paths, vec!["modules/intro.md"]);
    }

    #[test]
    fn test_from_dir_missing_root() {
        let dir = tempdir().unwrap();
        let result = FileSnapshot::from_dir(&dir.path().join("nope"), &[]);
        assert!(matches!(result, Err(SnapshotError::MissingRoot(_))));
    }

    #[test]
    fn test_from_dir_bad_ignore_pattern() {
        let dir = tempdir().unwrap();
        let result = FileSnapshot::from_dir(dir.path(), &["(".to_string()]);
        assert!(matches!(result, Err(SnapshotError::IgnorePattern { .. })));
    }
}
