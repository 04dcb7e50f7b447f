//! Course documents (`courses/*.md`).

use super::{read_frontmatter, required_string};
use crate::fields::{parse_blocks, BlockGrammar};
use crate::models::{CourseDoc, CourseItemSpec, LinkRef, ParseOutcome};
use crate::slug::suggest_slug;
use crate::wikilinks::parse_wikilink;
use coursemark_types::ContentError;

const COURSE_GRAMMAR: BlockGrammar<'static> = BlockGrammar {
    levels: &[1],
    keywords: &["Module", "Meeting"],
};

/// Parse a course file
pub fn parse_course(content: &str, path: &str) -> ParseOutcome<CourseDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };
    let fm = &parsed.frontmatter;

    let slug = required_string(fm, "slug", path, &mut errors);
    let title = required_string(fm, "title", path, &mut errors);
    let Some(slug) = slug else {
        return ParseOutcome::failed(errors);
    };
    let slug_line = fm.line_of("slug");
    if let Some(suggested) = suggest_slug(&slug) {
        errors.push(
            ContentError::warning(path, format!("Slug '{}' is not URL-safe", slug))
                .at(slug_line)
                .with_suggestion(format!("slug: {}", suggested)),
        );
    }

    let tree = parse_blocks(parsed.body, parsed.body_line, &COURSE_GRAMMAR, path, &mut errors);
    let mut items = Vec::new();
    for block in &tree.blocks {
        match block.kind.as_str() {
            "Module" => match parse_wikilink(&block.title) {
                Some(link) => items.push(CourseItemSpec::Module {
                    link: LinkRef {
                        target: link.path,
                        label: link.label,
                        line: block.line,
                    },
                    optional: block.flag("optional", path, &mut errors),
                }),
                None => errors.push(
                    ContentError::error(path, "Module entry has no link to a module file")
                        .at_line(block.line)
                        .with_suggestion("# Module: [[../modules/module-name]]"),
                ),
            },
            "Meeting" => match block.title.trim().parse::<u32>() {
                Ok(number) => items.push(CourseItemSpec::Meeting { number }),
                Err(_) => errors.push(
                    ContentError::error(
                        path,
                        format!("Meeting number '{}' is not a whole number", block.title),
                    )
                    .at_line(block.line)
                    .with_suggestion("# Meeting: 1"),
                ),
            },
            _ => {}
        }
    }

    if items.is_empty() {
        errors.push(
            ContentError::warning(path, "Course has no modules or meetings")
                .at_line(parsed.body_line),
        );
    }

    ParseOutcome::new(
        Some(CourseDoc {
            path: path.to_string(),
            title: title.unwrap_or_else(|| slug.clone()),
            slug,
            slug_line,
            items,
        }),
        errors,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_course() {
        let content = "---\nslug: fundamentals\ntitle: Fundamentals\n---\n# Module: [[../modules/intro|Intro]]\n# Meeting: 1\n# Module: [[../modules/risks]]\noptional:: true\n";
        let outcome = parse_course(content, "courses/fundamentals.md");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let course = outcome.document.unwrap();
        assert_eq!(course.items.len(), 3);
        match &course.items[0] {
            CourseItemSpec::Module { link, optional } => {
                assert_eq!(link.target, "../modules/intro");
                assert_eq!(link.line, 5);
                assert!(!optional);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(course.items[1], CourseItemSpec::Meeting { number: 1 });
        assert!(matches!(&course.items[2], CourseItemSpec::Module { optional: true, .. }));
    }

    #[test]
    fn test_bad_meeting_number_drops_item() {
        let content = "---\nslug: c\ntitle: C\n---\n# Meeting: first\n# Module: [[../modules/a]]\n";
        let outcome = parse_course(content, "courses/c.md");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].message.contains("'first'"));
        assert_eq!(outcome.document.unwrap().items.len(), 1);
    }

    #[test]
    fn test_missing_frontmatter_fields() {
        let outcome = parse_course("# Module: [[../modules/a]]\n", "courses/c.md");
        assert!(outcome.document.is_none());
        assert_eq!(outcome.errors.len(), 2);
    }
}
