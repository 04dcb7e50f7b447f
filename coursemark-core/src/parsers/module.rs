//! Module documents (`modules/*.md`).

use super::{
    chat_segment, id_field, lens_ref, misplaced_block, parse_segment, range_value, read_frontmatter,
    required_source, required_string, SEGMENT_KINDS,
};
use crate::fields::{parse_blocks, Block, BlockGrammar};
use crate::models::{ModuleBlock, ModuleDoc, ParseOutcome, SegmentSpec};
use crate::slug::suggest_slug;
use coursemark_types::ContentError;

const MODULE_GRAMMAR: BlockGrammar<'static> = BlockGrammar {
    levels: &[1, 2],
    keywords: &[
        "Page",
        "Learning Outcome",
        "Uncategorized",
        "Lens",
        "Text",
        "Chat",
        "Question",
        "Article-excerpt",
        "Video-excerpt",
        "Article",
        "Video",
    ],
};

/// Parse a module file
pub fn parse_module(content: &str, path: &str) -> ParseOutcome<ModuleDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };
    let fm = &parsed.frontmatter;

    let slug = required_string(fm, "slug", path, &mut errors);
    let title = required_string(fm, "title", path, &mut errors);
    let id = id_field(fm, path, false, &mut errors);

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

    let tree = parse_blocks(parsed.body, parsed.body_line, &MODULE_GRAMMAR, path, &mut errors);
    let mut blocks = Vec::new();
    for block in tree.blocks.iter().filter(|b| b.level == 1) {
        if let Some(parsed_block) = parse_block(block, path, &mut errors) {
            blocks.push(parsed_block);
        }
    }

    if blocks.is_empty() {
        errors.push(
            ContentError::warning(path, "Module has no sections")
                .at_line(parsed.body_line)
                .with_suggestion(
                    "Add a '# Page:', '# Learning Outcome:' or '# Uncategorized:' section",
                ),
        );
    }

    ParseOutcome::new(
        Some(ModuleDoc {
            path: path.to_string(),
            title: title.unwrap_or_else(|| slug.clone()),
            slug,
            slug_line,
            id,
            blocks,
        }),
        errors,
    )
}

fn parse_block(block: &Block, path: &str, errors: &mut Vec<ContentError>) -> Option<ModuleBlock> {
    let line = block.line;
    match block.kind.as_str() {
        "Page" => {
            let mut segments = Vec::new();
            for child in &block.children {
                if !SEGMENT_KINDS.contains(&child.kind.as_str()) {
                    if is_keyword(&child.kind) {
                        errors.push(misplaced_block(child, "a Page section", path));
                    }
                    continue;
                }
                if matches!(child.kind.as_str(), "Article-excerpt" | "Video-excerpt") {
                    errors.push(
                        ContentError::warning(
                            path,
                            format!(
                                "{} segment inside a Page section; pages hold text, chat and question segments",
                                child.kind
                            ),
                        )
                        .at_line(child.line),
                    );
                }
                if let Some(segment) = parse_segment(child, path, errors) {
                    segments.push(segment);
                }
            }
            Some(ModuleBlock::Page {
                title: block.title.clone(),
                id: block.value("id").map(str::to_string),
                optional: block.flag("optional", path, errors),
                segments,
                line,
            })
        }
        "Learning Outcome" => {
            reject_children(block, path, errors);
            let link = required_source(block, path, errors)?;
            Some(ModuleBlock::LearningOutcome {
                link,
                optional: block.flag("optional", path, errors),
                line,
            })
        }
        "Uncategorized" => {
            let mut lenses = Vec::new();
            for child in &block.children {
                if child.kind == "Lens" {
                    lenses.extend(lens_ref(child, path, errors));
                } else if is_keyword(&child.kind) {
                    errors.push(misplaced_block(child, "an Uncategorized section", path));
                }
            }
            if lenses.is_empty() {
                errors.push(
                    ContentError::warning(path, "Uncategorized section has no lens references")
                        .at_line(line)
                        .with_suggestion("## Lens:\nsource:: [[../Lenses/...]]"),
                );
            }
            Some(ModuleBlock::Uncategorized { lenses, line })
        }
        "Text" => {
            reject_children(block, path, errors);
            match parse_segment(block, path, errors)? {
                SegmentSpec::Text { content, .. } => {
                    Some(ModuleBlock::LegacyText { content, line })
                }
                _ => None,
            }
        }
        "Chat" => {
            reject_children(block, path, errors);
            Some(ModuleBlock::LegacyChat {
                chat: chat_segment(block, path, errors)?,
                line,
            })
        }
        "Article" | "Video" => {
            reject_children(block, path, errors);
            let source = required_source(block, path, errors)?;
            let title = block.title_or_none();
            let from = range_value(block, "from");
            let to = range_value(block, "to");
            let optional = block.flag("optional", path, errors);
            Some(if block.kind == "Article" {
                ModuleBlock::LegacyArticle {
                    title,
                    source,
                    from,
                    to,
                    optional,
                    line,
                }
            } else {
                ModuleBlock::LegacyVideo {
                    title,
                    source,
                    from,
                    to,
                    optional,
                    line,
                }
            })
        }
        kind if is_keyword(kind) => {
            errors.push(
                ContentError::error(
                    path,
                    format!("'{}' cannot be used as a top-level section", kind),
                )
                .at_line(line),
            );
            None
        }
        // Unknown types were reported while splitting blocks
        _ => None,
    }
}

fn is_keyword(kind: &str) -> bool {
    MODULE_GRAMMAR.keywords.contains(&kind)
}

fn reject_children(block: &Block, path: &str, errors: &mut Vec<ContentError>) {
    for child in block.children.iter().filter(|c| is_keyword(&c.kind)) {
        errors.push(misplaced_block(child, &format!("a {} section", block.kind), path));
    }
}
