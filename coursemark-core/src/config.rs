//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "coursemark.yml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Main configuration struct matching the coursemark.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the content repository
    pub content_dir: PathBuf,

    /// Where `build` writes the result JSON
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Regexes over relative paths skipped while loading
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Make `verify` fail on warnings too
    #[serde(default)]
    pub fail_on_warnings: bool,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_output() -> PathBuf {
    PathBuf::from("content.json")
}

impl Config {
    /// Configuration for a content directory given on the command line
    pub fn for_content_dir(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            output: default_output(),
            ignore_patterns: Vec::new(),
            fail_on_warnings: false,
            config_path: None,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        if config.content_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("content_dir".to_string()));
        }

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Content directory, resolved relative to config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.content_dir)
    }

    /// Output file, resolved relative to config file
    pub fn output_path(&self) -> PathBuf {
        self.resolve_path(&self.output)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match self.config_path.as_ref().and_then(|p| p.parent()) {
            Some(parent) if !path.is_absolute() => parent.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_and_relative_paths() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "content_dir: content\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.content_dir(), dir.path().join("content"));
        assert_eq!(config.output_path(), dir.path().join("content.json"));
        assert!(config.ignore_patterns.is_empty());
        assert!(!config.fail_on_warnings);
    }

    #[test]
    fn test_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            "content_dir: /srv/content\noutput: build/out.json\nignore_patterns: [\"^drafts/\"]\nfail_on_warnings: true\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.content_dir(), PathBuf::from("/srv/content"));
        assert_eq!(config.output_path(), dir.path().join("build/out.json"));
        assert_eq!(config.ignore_patterns, vec!["^drafts/"]);
        assert!(config.fail_on_warnings);
    }

    #[test]
    fn test_missing_content_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "output: x.json\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));

        fs::write(&path, "content_dir: \"\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_command_line_config_is_not_relocated() {
        let config = Config::for_content_dir("content");
        assert_eq!(config.content_dir(), PathBuf::from("content"));
        assert_eq!(config.output_path(), PathBuf::from("content.json"));
    }
}
