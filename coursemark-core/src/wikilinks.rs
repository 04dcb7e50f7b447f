//! Wikilink parsing and resolution for `[[path]]` and `[[path|label]]` syntax.

use crate::snapshot::FileSnapshot;

/// Extensions probed when a link omits one
pub const KNOWN_EXTENSIONS: &[&str] = &[".md", ".timestamps.json"];

/// Maximum number of near-miss files offered in a suggestion
pub const MAX_SUGGESTIONS: usize = 3;

/// A parsed wikilink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLink {
    pub path: String,
    pub label: Option<String>,
}

/// Parse a wikilink out of a field value
///
/// Accepts `[[path]]`, `[[path|label]]`, an embed `![[path]]`, or a bare
/// path. A `#fragment` on the path is dropped. Returns `None` for an empty
/// target or an unclosed `[[`.
///
/// # Example
///
/// ```
/// use coursemark_core::wikilinks::parse_wikilink;
///
/// let link = parse_wikilink("[[../Lenses/Alignment|the alignment lens]]").unwrap();
/// assert_eq!(link.path, "../Lenses/Alignment");
/// assert_eq!(link.label.as_deref(), Some("the alignment lens"));
/// ```
pub fn parse_wikilink(raw: &str) -> Option<WikiLink> {
    let raw = raw.trim();
    let inner = match raw.find("[[") {
        Some(start) => {
            let rest = &raw[start + 2..];
            let end = rest.find("]]")?;
            &rest[..end]
        }
        None => raw,
    };

    let (target, label) = match inner.split_once('|') {
        Some((target, label)) => (target.trim(), Some(label.trim().to_string())),
        None => (inner.trim(), None),
    };
    let target = target.split('#').next().unwrap_or("").trim();

    if target.is_empty() {
        return None;
    }

    Some(WikiLink {
        path: target.to_string(),
        label: label.filter(|l| !l.is_empty()),
    })
}

/// Resolve a link target against the file that contains it
///
/// Targets starting with `./` or `../` are relative to the source file's
/// directory; anything else is relative to the repository root. `.` and
/// `..` segments are collapsed; `..` past the root is dropped.
pub fn resolve_wikilink(target: &str, source_path: &str) -> String {
    let target = target.trim().replace('\\', "/");
    let relative = target.starts_with("./") || target.starts_with("../");

    let mut parts: Vec<&str> = Vec::new();
    if relative {
        if let Some((dir, _)) = source_path.rsplit_once('/') {
            parts.extend(dir.split('/').filter(|s| !s.is_empty()));
        }
    }

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }

    parts.join("/")
}

/// Find the snapshot path a resolved link refers to
///
/// Probes the path verbatim, then with each known extension appended.
pub fn find_file_in_snapshot(resolved: &str, files: &FileSnapshot) -> Option<String> {
    if files.contains(resolved) {
        return Some(resolved.to_string());
    }
    KNOWN_EXTENSIONS
        .iter()
        .map(|ext| format!("{resolved}{ext}"))
        .find(|candidate| files.contains(candidate))
}

/// Edit distance above which a file is too different to suggest
pub fn suggestion_threshold(name: &str) -> usize {
    let len = name.chars().count();
    // ceil(0.4 * len) without floats
    3usize.min((len * 2).div_ceil(5))
}

/// File name without directory or document extension
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    KNOWN_EXTENSIONS
        .iter()
        .find_map(|ext| name.strip_suffix(ext))
        .unwrap_or(name)
}

/// Near-miss files for a link that did not resolve
///
/// Candidates are files under `expected_dir` (or the target's own directory
/// when none is given). A case-insensitive match on the whole path is always
/// offered first; otherwise file stems are ranked by Levenshtein distance and
/// kept when within [`suggestion_threshold`].
pub fn find_similar_files(
    resolved: &str,
    files: &FileSnapshot,
    expected_dir: Option<&str>,
) -> Vec<String> {
    let wanted_lower = resolved.to_lowercase();
    for ext in std::iter::once("").chain(KNOWN_EXTENSIONS.iter().copied()) {
        let probe = format!("{wanted_lower}{ext}");
        if let Some(path) = files.paths().find(|p| p.to_lowercase() == probe) {
            return vec![path.to_string()];
        }
    }

    let dir = match expected_dir {
        Some(dir) => dir.trim_end_matches('/').to_string(),
        None => resolved
            .rsplit_once('/')
            .map(|(d, _)| d.to_string())
            .unwrap_or_default(),
    };
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };

    let stem = file_stem(resolved).to_lowercase();
    let threshold = suggestion_threshold(&stem);

    let mut scored: Vec<(usize, &str)> = files
        .paths()
        .filter(|p| p.starts_with(&prefix) && p.ends_with(".md"))
        .map(|p| (strsim::levenshtein(&stem, &file_stem(p).to_lowercase()), p))
        .filter(|(distance, _)| *distance <= threshold)
        .collect();
    scored.sort();
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, p)| p.to_string())
        .collect()
}

/// Render near-miss files as a human suggestion
pub fn format_suggestion(candidates: &[String]) -> Option<String> {
    match candidates {
        [] => None,
        [one] => Some(format!("Did you mean: {one}?")),
        many => Some(format!("Did you mean one of: {}?", many.join(", "))),
    }
}

/// Outcome of looking up a link in the snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    Missing {
        resolved: String,
        suggestion: Option<String>,
    },
}

/// Resolve a link target and search the snapshot for it
pub fn lookup(
    target: &str,
    source_path: &str,
    files: &FileSnapshot,
    expected_dir: Option<&str>,
) -> Resolution {
    let resolved = resolve_wikilink(target, source_path);
    match find_file_in_snapshot(&resolved, files) {
        Some(path) => Resolution::Found(path),
        None => {
            let candidates = find_similar_files(&resolved, files, expected_dir);
            Resolution::Missing {
                resolved,
                suggestion: format_suggestion(&candidates),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(paths: &[&str]) -> FileSnapshot {
        paths.iter().map(|p| (*p, "")).collect()
    }

    #[test]
    fn test_parse_simple_and_labelled() {
        let link = parse_wikilink("[[../Lenses/Foo]]").unwrap();
        assert_eq!(link.path, "../Lenses/Foo");
        assert_eq!(link.label, None);

        let link = parse_wikilink("[[../Lenses/Foo|Foo lens]]").unwrap();
        assert_eq!(link.label.as_deref(), Some("Foo lens"));
    }

    #[test]
    fn test_parse_embed_fragment_and_bare() {
        assert_eq!(parse_wikilink("![[articles/a#Intro]]").unwrap().path, "articles/a");
        assert_eq!(parse_wikilink("modules/intro").unwrap().path, "modules/intro");
    }

    #[test]
    fn test_parse_rejects_empty_and_unclosed() {
        assert_eq!(parse_wikilink("[[]]"), None);
        assert_eq!(parse_wikilink("[[|label]]"), None);
        assert_eq!(parse_wikilink("[[../Lenses/Foo"), None);
    }

    #[test]
    fn test_resolve_relative_and_root() {
        assert_eq!(
            resolve_wikilink("../Lenses/Foo", "modules/intro.md"),
            "Lenses/Foo"
        );
        assert_eq!(
            resolve_wikilink("./Foo.md", "Lenses/group/a.md"),
            "Lenses/group/Foo.md"
        );
        assert_eq!(
            resolve_wikilink("../../articles/x", "Lenses/group/a.md"),
            "articles/x"
        );
        assert_eq!(resolve_wikilink("modules/intro", "courses/c.md"), "modules/intro");
        assert_eq!(resolve_wikilink("../../../x", "a/b.md"), "x");
    }

    #[test]
    fn test_find_file_probes_extensions() {
        let files = snapshot(&["Lenses/Foo.md", "video_transcripts/v.timestamps.json"]);
        assert_eq!(
            find_file_in_snapshot("Lenses/Foo", &files),
            Some("Lenses/Foo.md".to_string())
        );
        assert_eq!(
            find_file_in_snapshot("Lenses/Foo.md", &files),
            Some("Lenses/Foo.md".to_string())
        );
        assert_eq!(
            find_file_in_snapshot("video_transcripts/v", &files),
            Some("video_transcripts/v.timestamps.json".to_string())
        );
        assert_eq!(find_file_in_snapshot("Lenses/Bar", &files), None);
    }

    #[test]
    fn test_threshold() {
        assert_eq!(suggestion_threshold("ab"), 1);
        assert_eq!(suggestion_threshold("abcde"), 2);
        assert_eq!(suggestion_threshold("a-much-longer-name"), 3);
    }

    #[test]
    fn test_similar_files_ranked_within_expected_dir() {
        let files = snapshot(&[
            "Lenses/alignment.md",
            "Lenses/alignmnet-old.md",
            "Lenses/interpretability.md",
            "articles/alignment.md",
        ]);
        let similar = find_similar_files("Lenses/alignmet", &files, Some("Lenses"));
        assert_eq!(similar, vec!["Lenses/alignment.md"]);
    }

    #[test]
    fn test_similar_files_case_insensitive_path() {
        let files = snapshot(&["Lenses/Alignment.md"]);
        let similar = find_similar_files("lenses/alignment", &files, Some("Lenses"));
        assert_eq!(similar, vec!["Lenses/Alignment.md"]);
    }

    #[test]
    fn test_no_suggestion_for_unrelated_names() {
        let files = snapshot(&["Lenses/interpretability.md"]);
        assert!(find_similar_files("Lenses/ethics", &files, Some("Lenses")).is_empty());
    }

    #[test]
    fn test_lookup_missing_has_suggestion() {
        let files = snapshot(&["Lenses/does-not-exists.md"]);
        match lookup("../Lenses/does-not-exist.md", "modules/m.md", &files, Some("Lenses")) {
            Resolution::Missing {
                resolved,
                suggestion,
            } => {
                assert_eq!(resolved, "Lenses/does-not-exist.md");
                assert_eq!(
                    suggestion.as_deref(),
                    Some("Did you mean: Lenses/does-not-exists.md?")
                );
            }
            other => panic!("expected missing, got {other:?}"),
        }
    }

    #[test]
    fn test_format_suggestion() {
        assert_eq!(format_suggestion(&[]), None);
        assert_eq!(
            format_suggestion(&["a".into(), "b".into()]).as_deref(),
            Some("Did you mean one of: a, b?")
        );
    }
}
