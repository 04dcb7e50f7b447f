//! Lens documents (`Lenses/**/*.md`).
//!
//! A lens is a sequence of `### ` sections. Article and video sections name
//! their source and interleave excerpts of it with text, chat and question
//! segments; page sections carry text-only segments.

use super::{
    id_field, misplaced_block, parse_segment, read_frontmatter, required_source, SEGMENT_KINDS,
};
use crate::fields::{parse_blocks, Block, BlockGrammar};
use crate::models::{LensDoc, LensSection, LensSectionKind, ParseOutcome};
use coursemark_types::ContentError;

const LENS_GRAMMAR: BlockGrammar<'static> = BlockGrammar {
    levels: &[3, 4],
    keywords: &[
        "Page",
        "Article",
        "Video",
        "Text",
        "Chat",
        "Question",
        "Article-excerpt",
        "Video-excerpt",
    ],
};

/// Parse a lens file
pub fn parse_lens(content: &str, path: &str) -> ParseOutcome<LensDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };

    let id = id_field(&parsed.frontmatter, path, true, &mut errors);
    let tree = parse_blocks(parsed.body, parsed.body_line, &LENS_GRAMMAR, path, &mut errors);

    let mut sections = Vec::new();
    for block in tree.blocks.iter().filter(|b| b.level == 3) {
        let kind = match block.kind.as_str() {
            "Page" => LensSectionKind::Page,
            "Article" => LensSectionKind::Article,
            "Video" => LensSectionKind::Video,
            other if SEGMENT_KINDS.contains(&other) => {
                errors.push(misplaced_block(
                    block,
                    "a lens outside a Page, Article or Video section",
                    path,
                ));
                continue;
            }
            _ => continue,
        };
        if let Some(section) = parse_section(block, kind, path, &mut errors) {
            sections.push(section);
        }
    }

    if sections.is_empty() {
        errors.push(
            ContentError::warning(path, "Lens has no sections")
                .at_line(parsed.body_line)
                .with_suggestion("Add a '### Page:', '### Article:' or '### Video:' section"),
        );
    }

    ParseOutcome::new(
        Some(LensDoc {
            path: path.to_string(),
            id,
            sections,
        }),
        errors,
    )
}

fn parse_section(
    block: &Block,
    kind: LensSectionKind,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<LensSection> {
    let source = match kind {
        LensSectionKind::Page => None,
        LensSectionKind::Article | LensSectionKind::Video => {
            Some(required_source(block, path, errors)?)
        }
    };

    let mut segments = Vec::new();
    for child in &block.children {
        if !SEGMENT_KINDS.contains(&child.kind.as_str()) {
            if LENS_GRAMMAR.keywords.contains(&child.kind.as_str()) {
                errors.push(misplaced_block(child, &format!("a {} section", kind.label()), path));
            }
            continue;
        }
        if let Some(problem) = segment_mismatch(kind, &child.kind) {
            errors.push(ContentError::warning(path, problem).at_line(child.line));
        }
        if let Some(segment) = parse_segment(child, path, errors) {
            segments.push(segment);
        }
    }

    Some(LensSection {
        kind,
        title: block.title_or_none(),
        source,
        segments,
        line: block.line,
    })
}

/// Describe an excerpt segment that does not match its section's source
fn segment_mismatch(section: LensSectionKind, segment: &str) -> Option<String> {
    if !segment.ends_with("-excerpt") {
        return None;
    }
    let matches_source = match section {
        LensSectionKind::Page => {
            return Some(format!(
                "{} segment in a Page section; page sections are text-only",
                segment
            ))
        }
        LensSectionKind::Article => segment == "Article-excerpt",
        LensSectionKind::Video => segment == "Video-excerpt",
    };
    (!matches_source).then(|| {
        format!(
            "{} segment in an {} section; it cannot excerpt the section's source",
            segment,
            section.label()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SegmentSpec;

    const LENS: &str = r#"---
id: 7d444840-9dc0-11d1-b245-5ffdce74fad2
tags: [alignment]
---
### Article: Specification gaming
source:: [[../articles/specification-gaming]]

#### Text
content:: Read the following excerpt.

#### Article-excerpt
from:: "Specification gaming is"
to:: "the intended outcome."

#### Chat
instructions:: Discuss the examples.

### Page: Reflection
#### Question
content:: What surprised you?
maxChars:: 500
"#;

    #[test]
    fn test_parse_lens() {
        let outcome = parse_lens(LENS, "Lenses/spec-gaming.md");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let lens = outcome.document.unwrap();
        assert_eq!(lens.sections.len(), 2);

        let article = &lens.sections[0];
        assert_eq!(article.kind, LensSectionKind::Article);
        assert_eq!(article.title.as_deref(), Some("Specification gaming"));
        assert_eq!(
            article.source.as_ref().unwrap().target,
            "../articles/specification-gaming"
        );
        assert_eq!(article.segments.len(), 3);
        match &article.segments[1] {
            SegmentSpec::ArticleExcerpt { from, to, line, .. } => {
                assert_eq!(from.as_deref(), Some("Specification gaming is"));
                assert_eq!(to.as_deref(), Some("the intended outcome."));
                assert_eq!(*line, 11);
            }
            other => panic!("unexpected {other:?}"),
        }

        let page = &lens.sections[1];
        assert_eq!(page.kind, LensSectionKind::Page);
        assert!(matches!(
            &page.segments[0],
            SegmentSpec::Question { max_chars: Some(500), .. }
        ));
    }

    #[test]
    fn test_video_excerpt_in_article_section_warns() {
        let content = "---\nid: 7d444840-9dc0-11d1-b245-5ffdce74fad2\n---\n### Article:\nsource:: [[../articles/a]]\n#### Video-excerpt\nfrom:: 0:10\nto:: 0:20\n";
        let outcome = parse_lens(content, "Lenses/a.md");
        assert_eq!(outcome.errors.len(), 1);
        let warning = &outcome.errors[0];
        assert!(warning.is_warning());
        assert!(warning.message.starts_with("Video-excerpt segment in an Article section"));
        assert_eq!(warning.line, Some(6));
        assert_eq!(outcome.document.unwrap().sections[0].segments.len(), 1);
    }

    #[test]
    fn test_excerpt_in_page_section_warns() {
        let content = "---\nid: 7d444840-9dc0-11d1-b245-5ffdce74fad2\n---\n### Page: P\n#### Article-excerpt\nfrom:: a\n";
        let outcome = parse_lens(content, "Lenses/a.md");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("text-only"));
    }

    #[test]
    fn test_article_section_without_source_is_dropped() {
        let content = "---\nid: 7d444840-9dc0-11d1-b245-5ffdce74fad2\n---\n### Article: A\n#### Text\ncontent:: hi\n";
        let outcome = parse_lens(content, "Lenses/a.md");
        let lens = outcome.document.unwrap();
        assert!(lens.sections.is_empty());
        assert!(outcome.errors.iter().any(|e| e.is_error() && e.message.contains("source::")));
        assert!(outcome.errors.iter().any(|e| e.message == "Lens has no sections"));
    }

    #[test]
    fn test_non_string_id() {
        let content = "---\nid: 123\n---\n### Page: P\n#### Text\ncontent:: hi\n";
        let outcome = parse_lens(content, "Lenses/a.md");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("must be a string"));
        assert!(outcome.document.unwrap().id.is_none());
    }
}
