//! Slug uniqueness for modules and courses.

use coursemark_types::ContentError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugEntry {
    pub slug: String,
    pub file: String,
    pub line: Option<usize>,
}

/// One error per slug shared by several files, naming all of them
///
/// `kind` names the document kind in the message ("module", "course").
pub fn validate_slugs(entries: &[SlugEntry], kind: &str) -> Vec<ContentError> {
    let mut by_slug: BTreeMap<&str, Vec<&SlugEntry>> = BTreeMap::new();
    for entry in entries {
        by_slug.entry(entry.slug.as_str()).or_default().push(entry);
    }

    by_slug
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|(slug, files)| {
            let names: Vec<&str> = files.iter().map(|e| e.file.as_str()).collect();
            ContentError::error(
                files[1].file.as_str(),
                format!(
                    "Duplicate {} slug '{}' used by {}",
                    kind,
                    slug,
                    names.join(", ")
                ),
            )
            .at(files[1].line)
            .with_suggestion(format!("Give each {} a unique slug", kind))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(slug: &str, file: &str) -> SlugEntry {
        SlugEntry {
            slug: slug.to_string(),
            file: file.to_string(),
            line: Some(2),
        }
    }

    #[test]
    fn test_one_error_per_duplicate_slug() {
        let errors = validate_slugs(
            &[
                entry("intro", "modules/a.md"),
                entry("other", "modules/b.md"),
                entry("intro", "modules/c.md"),
            ],
            "module",
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].file, "modules/c.md");
        assert!(errors[0].message.contains("modules/a.md"));
        assert!(errors[0].message.contains("modules/c.md"));
    }

    #[test]
    fn test_unique_slugs_pass() {
        assert!(validate_slugs(&[entry("a", "x.md"), entry("b", "y.md")], "course").is_empty());
    }
}
