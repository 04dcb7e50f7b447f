//! Visibility tiers derived from frontmatter tags.
//!
//! A file may only reference files that are at least as visible as itself:
//! production content references production content, work-in-progress
//! content may also reference work-in-progress content, and ignored content
//! is excluded from processing altogether.

use crate::frontmatter::parse_frontmatter;
use crate::models::{transcript_path_for, TIMESTAMPS_SUFFIX};
use crate::snapshot::FileSnapshot;
use coursemark_types::{ContentError, ContentTier};
use std::collections::BTreeMap;

/// Tier of every file in a snapshot
#[derive(Debug, Clone, Default)]
pub struct TierMap {
    tiers: BTreeMap<String, ContentTier>,
}

impl TierMap {
    /// Tier of `path`; files without frontmatter (or unknown paths) are production
    pub fn get(&self, path: &str) -> ContentTier {
        self.tiers.get(path).copied().unwrap_or_default()
    }

    pub fn set(&mut self, path: impl Into<String>, tier: ContentTier) {
        self.tiers.insert(path.into(), tier);
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.get(path) == ContentTier::Ignored
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ContentTier)> {
        self.tiers.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Tier named by a single tag, if any
pub fn tier_from_tag(tag: &str) -> Option<ContentTier> {
    let tag = tag.trim().trim_start_matches('#');
    let tag = tag.strip_prefix("status/").unwrap_or(tag);
    match tag.to_ascii_lowercase().as_str() {
        "ignore" | "ignored" => Some(ContentTier::Ignored),
        "wip" | "work-in-progress" | "draft" => Some(ContentTier::Wip),
        _ => None,
    }
}

/// Most restrictive tier named by a tag list
pub fn tier_from_tags<S: AsRef<str>>(tags: &[S]) -> ContentTier {
    tags.iter()
        .filter_map(|t| tier_from_tag(t.as_ref()))
        .max()
        .unwrap_or_default()
}

/// Classify every markdown file in the snapshot
///
/// A file's tier depends only on its own frontmatter. Files whose
/// frontmatter cannot be read are production; the document parser reports
/// the frontmatter problem. Timestamp sidecars take their transcript's tier.
pub fn classify_tiers(files: &FileSnapshot) -> TierMap {
    let mut map = TierMap::default();
    for (path, content) in files.iter() {
        if !path.ends_with(".md") {
            continue;
        }
        let tier = parse_frontmatter(content)
            .map(|parsed| tier_from_tags(&parsed.frontmatter.tags()))
            .unwrap_or_default();
        if tier != ContentTier::Production {
            map.set(path, tier);
        }
    }

    let sidecars: Vec<(&str, ContentTier)> = files
        .paths()
        .filter(|path| path.ends_with(TIMESTAMPS_SUFFIX))
        .map(|path| (path, map.get(&transcript_path_for(path))))
        .filter(|(_, tier)| *tier != ContentTier::Production)
        .collect();
    for (path, tier) in sidecars {
        map.set(path, tier);
    }
    map
}

/// Check that a reference does not point at less visible content
///
/// Returns an error when `child_tier` is more restrictive than
/// `parent_tier`. Ignored children never produce an error; callers skip
/// them instead of following the reference.
pub fn check_tier_violation(
    parent_path: &str,
    parent_tier: ContentTier,
    child_path: &str,
    child_tier: ContentTier,
    child_label: &str,
    line: Option<usize>,
) -> Option<ContentError> {
    if child_tier == ContentTier::Ignored || child_tier <= parent_tier {
        return None;
    }
    Some(
        ContentError::error(
            parent_path,
            format!(
                "{} content references {} '{}', which is tagged {}",
                capitalize(parent_tier.as_str()),
                child_label,
                child_path,
                child_tier.as_str()
            ),
        )
        .at(line)
        .with_suggestion(format!(
            "Remove the reference or promote {} to {}",
            child_path,
            parent_tier.as_str()
        )),
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_tags() {
        assert_eq!(tier_from_tags::<&str>(&[]), ContentTier::Production);
        assert_eq!(tier_from_tags(&["topic/ai", "wip"]), ContentTier::Wip);
        assert_eq!(tier_from_tags(&["#status/WIP"]), ContentTier::Wip);
        assert_eq!(tier_from_tags(&["wip", "ignore"]), ContentTier::Ignored);
    }

    #[test]
    fn test_classify_tiers_reads_only_own_frontmatter() {
        let files: FileSnapshot = [
            ("modules/a.md", "---\nslug: a\ntags: [wip]\n---\n"),
            ("Lenses/b.md", "---\ntags:\n  - ignore\n---\n"),
            ("Lenses/c.md", "no frontmatter"),
            ("Lenses/broken.md", "---\ntags: [unclosed\n---\n"),
            ("video_transcripts/v.timestamps.json", "[]"),
        ]
        .into_iter()
        .collect();

        let tiers = classify_tiers(&files);
        assert_eq!(tiers.get("modules/a.md"), ContentTier::Wip);
        assert_eq!(tiers.get("Lenses/b.md"), ContentTier::Ignored);
        assert_eq!(tiers.get("Lenses/c.md"), ContentTier::Production);
        assert_eq!(tiers.get("Lenses/broken.md"), ContentTier::Production);
        assert_eq!(
            tiers.get("video_transcripts/v.timestamps.json"),
            ContentTier::Production
        );
    }

    #[test]
    fn test_sidecar_follows_transcript_tier() {
        let files: FileSnapshot = [
            ("video_transcripts/draft.md", "---
tags: [wip]
---
Hi.
"),
            ("video_transcripts/draft.timestamps.json", "[]"),
            ("video_transcripts/hidden.md", "---
tags: [ignore]
---
Hi.
"),
            ("video_transcripts/hidden.timestamps.json", "[]"),
            ("video_transcripts/orphan.timestamps.json", "[]"),
        ]
        .into_iter()
        .collect();

        let tiers = classify_tiers(&files);
        assert_eq!(
            tiers.get("video_transcripts/draft.timestamps.json"),
            ContentTier::Wip
        );
        assert!(tiers.is_ignored("video_transcripts/hidden.timestamps.json"));
        assert_eq!(
            tiers.get("video_transcripts/orphan.timestamps.json"),
            ContentTier::Production
        );
    }

    #[test]
    fn test_production_referencing_wip_is_violation() {
        let err = check_tier_violation(
            "modules/a.md",
            ContentTier::Production,
            "Lenses/b.md",
            ContentTier::Wip,
            "lens",
            Some(7),
        )
        .unwrap();
        assert!(err.is_error());
        assert_eq!(err.file, "modules/a.md");
        assert_eq!(err.line, Some(7));
        assert!(err.message.contains("Lenses/b.md"));
        assert!(err.message.starts_with("Production content references lens"));
    }

    #[test]
    fn test_allowed_references() {
        use ContentTier::*;
        for (parent, child) in [(Production, Production), (Wip, Production), (Wip, Wip)] {
            assert!(check_tier_violation("p", parent, "c", child, "lens", None).is_none());
        }
    }

    #[test]
    fn test_ignored_child_is_skipped_not_flagged() {
        assert!(check_tier_violation(
            "p",
            ContentTier::Production,
            "c",
            ContentTier::Ignored,
            "lens",
            None
        )
        .is_none());
    }
}
