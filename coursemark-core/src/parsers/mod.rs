//! Document parsers, one per document kind.
//!
//! Each parser takes the raw file text and its snapshot path and returns a
//! [`ParseOutcome`]: the document when enough structure exists to be useful,
//! plus every problem found along the way. Parsers never fail outright.

pub mod article;
pub mod course;
pub mod learning_outcome;
pub mod lens;
pub mod module;
pub mod timestamps;
pub mod video;

use crate::fields::{unquote, Block};
use crate::frontmatter::{parse_frontmatter, Frontmatter, Parsed};
use crate::models::{Document, DocumentKind, IdField, LensRef, LinkRef, ParseOutcome, SegmentSpec};
use crate::wikilinks::parse_wikilink;
use coursemark_types::ContentError;

pub use article::parse_article;
pub use course::parse_course;
pub use learning_outcome::parse_learning_outcome;
pub use lens::parse_lens;
pub use module::parse_module;
pub use timestamps::parse_timestamps;
pub use video::parse_video_transcript;

/// Parse a file with the parser for `kind`
pub fn parse_document(kind: DocumentKind, content: &str, path: &str) -> ParseOutcome<Document> {
    match kind {
        DocumentKind::Module => parse_module(content, path).map(Document::Module),
        DocumentKind::Course => parse_course(content, path).map(Document::Course),
        DocumentKind::LearningOutcome => {
            parse_learning_outcome(content, path).map(Document::LearningOutcome)
        }
        DocumentKind::Lens => parse_lens(content, path).map(Document::Lens),
        DocumentKind::Article => parse_article(content, path).map(Document::Article),
        DocumentKind::VideoTranscript => {
            parse_video_transcript(content, path).map(Document::VideoTranscript)
        }
        DocumentKind::TimestampSidecar => {
            parse_timestamps(content, path).map(Document::TimestampSidecar)
        }
    }
}

/// Split off frontmatter, reporting a located error when it is unreadable
pub(crate) fn read_frontmatter<'a>(
    content: &'a str,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<Parsed<'a>> {
    match parse_frontmatter(content) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            errors.push(ContentError::error(path, e.to_string()).at_line(e.line()));
            None
        }
    }
}

/// Optional string field; a value of another YAML type is a type error
pub(crate) fn string_field(
    fm: &Frontmatter,
    key: &str,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<String> {
    match fm.get_str(key) {
        Ok(value) => value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
        Err(mismatch) => {
            errors.push(
                ContentError::error(
                    path,
                    format!(
                        "Field '{}' must be a {}, found {}",
                        mismatch.key, mismatch.expected, mismatch.found
                    ),
                )
                .at(fm.line_of(key))
                .with_suggestion(format!("Quote the value: {}: \"...\"", key)),
            );
            None
        }
    }
}

/// Required string field; missing or empty is an error
pub(crate) fn required_string(
    fm: &Frontmatter,
    key: &str,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<String> {
    let type_ok = fm.get_str(key).is_ok();
    let value = string_field(fm, key, path, errors);
    if value.is_none() && type_ok {
        errors.push(
            ContentError::error(path, format!("Missing required field '{}'", key))
                .at(fm.line_of(key).or(Some(1))),
        );
    }
    value
}

/// The frontmatter `id`, if present and a string
pub(crate) fn id_field(
    fm: &Frontmatter,
    path: &str,
    required: bool,
    errors: &mut Vec<ContentError>,
) -> Option<IdField> {
    let value = if required {
        required_string(fm, "id", path, errors)
    } else {
        string_field(fm, "id", path, errors)
    };
    value.map(|value| IdField {
        value,
        field: "id",
        line: fm.line_of("id"),
    })
}

/// Author may be a single name or a list of names
pub(crate) fn author_field(
    fm: &Frontmatter,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<String> {
    match fm.get_string_list("author") {
        Ok(names) => {
            let names: Vec<&str> = names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        Err(mismatch) => {
            errors.push(
                ContentError::error(
                    path,
                    format!(
                        "Field 'author' must be a {}, found {}",
                        mismatch.expected, mismatch.found
                    ),
                )
                .at(fm.line_of("author")),
            );
            None
        }
    }
}

/// Parse the wikilink in a block field such as `source::`
pub(crate) fn link_field(
    block: &Block,
    name: &str,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<LinkRef> {
    let field = block.field(name)?;
    if field.value.trim().is_empty() {
        return None;
    }
    match parse_wikilink(&field.value) {
        Some(link) => Some(LinkRef {
            target: link.path,
            label: link.label,
            line: field.line,
        }),
        None => {
            errors.push(
                ContentError::error(
                    path,
                    format!("Invalid link in '{}::': {}", name, field.value),
                )
                .at_line(field.line)
                .with_suggestion(format!("{}:: [[path/to/file]]", name)),
            );
            None
        }
    }
}

/// `source::` that must be present on the block
pub(crate) fn required_source(
    block: &Block,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<LinkRef> {
    let has_value = block.value("source").is_some();
    let link = link_field(block, "source", path, errors);
    if !has_value {
        errors.push(
            ContentError::error(
                path,
                format!("'{}' section is missing a 'source::' field", block.kind),
            )
            .at_line(block.line)
            .with_suggestion("source:: [[path/to/file]]"),
        );
    }
    link
}

/// A `Lens:` block referencing a lens file
pub(crate) fn lens_ref(
    block: &Block,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<LensRef> {
    let link = required_source(block, path, errors)?;
    Some(LensRef {
        link,
        optional: block.flag("optional", path, errors),
    })
}

/// Unquoted anchor or timestamp value
pub(crate) fn range_value(block: &Block, name: &str) -> Option<String> {
    block
        .value(name)
        .map(unquote)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Segment block kinds shared by module pages and lens sections
pub(crate) const SEGMENT_KINDS: &[&str] = &[
    "Text",
    "Chat",
    "Question",
    "Article-excerpt",
    "Video-excerpt",
];

/// Parse a segment block; `None` when it is unusable (already reported)
pub(crate) fn parse_segment(
    block: &Block,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<SegmentSpec> {
    let line = block.line;
    match block.kind.as_str() {
        "Text" => Some(SegmentSpec::Text {
            content: required_value(block, "content", path, errors)?,
            line,
        }),
        "Chat" => Some(chat_segment(block, path, errors)?),
        "Question" => {
            let content = required_value(block, "content", path, errors)?;
            let max_chars = block.value("maxChars").and_then(|raw| match raw.parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => {
                    errors.push(
                        ContentError::warning(
                            path,
                            format!("Field 'maxChars' expects a whole number, got '{}'", raw),
                        )
                        .at(block.field("maxChars").map(|f| f.line)),
                    );
                    None
                }
            });
            Some(SegmentSpec::Question {
                content,
                assessment_instructions: block.value("assessmentInstructions").map(str::to_string),
                max_time: block.value("maxTime").map(str::to_string),
                max_chars,
                enforce_voice: block.flag("enforceVoice", path, errors),
                line,
            })
        }
        "Article-excerpt" => Some(SegmentSpec::ArticleExcerpt {
            from: range_value(block, "from"),
            to: range_value(block, "to"),
            source: link_field(block, "source", path, errors),
            line,
        }),
        "Video-excerpt" => Some(SegmentSpec::VideoExcerpt {
            from: range_value(block, "from"),
            to: range_value(block, "to"),
            source: link_field(block, "source", path, errors),
            line,
        }),
        _ => None,
    }
}

pub(crate) fn chat_segment(
    block: &Block,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<SegmentSpec> {
    Some(SegmentSpec::Chat {
        instructions: required_value(block, "instructions", path, errors)?,
        hide_previous_content_from_user: block.flag("hidePreviousContentFromUser", path, errors),
        hide_previous_content_from_tutor: block.flag("hidePreviousContentFromTutor", path, errors),
        line: block.line,
    })
}

fn required_value(
    block: &Block,
    name: &str,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<String> {
    match block.value(name) {
        Some(value) => Some(value.to_string()),
        None => {
            errors.push(
                ContentError::error(
                    path,
                    format!("{} segment is missing '{}::'", block.kind, name),
                )
                .at_line(block.line)
                .with_suggestion(format!("{}:: ...", name)),
            );
            None
        }
    }
}

/// Error for a known block kind used where it does not belong
pub(crate) fn misplaced_block(block: &Block, parent: &str, path: &str) -> ContentError {
    ContentError::error(
        path,
        format!("'{}' is not allowed inside {}", block.kind, parent),
    )
    .at_line(block.line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;

    fn block(kind: &str, fields: &[(&str, &str)]) -> Block {
        Block {
            level: 2,
            kind: kind.to_string(),
            title: String::new(),
            line: 10,
            fields: fields
                .iter()
                .enumerate()
                .map(|(i, (name, value))| Field {
                    name: name.to_string(),
                    value: value.to_string(),
                    line: 11 + i,
                })
                .collect(),
            children: vec![],
        }
    }

    #[test]
    fn test_id_type_error_is_reported_once() {
        let parsed = parse_frontmatter("---\nid: 42\n---\n").unwrap();
        let mut errors = Vec::new();
        assert!(id_field(&parsed.frontmatter, "Lenses/a.md", true, &mut errors).is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("must be a string, found number"));
        assert_eq!(errors[0].line, Some(2));
    }

    #[test]
    fn test_missing_required_id() {
        let parsed = parse_frontmatter("---\ntags: [a]\n---\n").unwrap();
        let mut errors = Vec::new();
        assert!(id_field(&parsed.frontmatter, "Lenses/a.md", true, &mut errors).is_none());
        assert_eq!(errors[0].message, "Missing required field 'id'");
    }

    #[test]
    fn test_segment_missing_content() {
        let mut errors = Vec::new();
        assert!(parse_segment(&block("Text", &[]), "m.md", &mut errors).is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, Some(10));
    }

    #[test]
    fn test_excerpt_segment_unquotes_anchors() {
        let mut errors = Vec::new();
        let spec = parse_segment(
            &block("Article-excerpt", &[("from", "\"The start\""), ("to", "the end")]),
            "l.md",
            &mut errors,
        )
        .unwrap();
        assert!(errors.is_empty());
        match spec {
            SegmentSpec::ArticleExcerpt { from, to, source, .. } => {
                assert_eq!(from.as_deref(), Some("The start"));
                assert_eq!(to.as_deref(), Some("the end"));
                assert!(source.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_bad_link_is_error() {
        let mut errors = Vec::new();
        let b = block("Lens", &[("source", "[[unclosed")]);
        assert!(lens_ref(&b, "modules/m.md", &mut errors).is_none());
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Invalid link"));
    }
}
