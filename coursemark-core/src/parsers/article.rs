//! Article documents (`articles/**/*.md`).

use super::{author_field, id_field, read_frontmatter, string_field};
use crate::models::{ArticleDoc, ParseOutcome};

/// Parse an article; the body is kept verbatim for excerpting
pub fn parse_article(content: &str, path: &str) -> ParseOutcome<ArticleDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };
    let fm = &parsed.frontmatter;

    let article = ArticleDoc {
        path: path.to_string(),
        id: id_field(fm, path, false, &mut errors),
        title: string_field(fm, "title", path, &mut errors),
        author: author_field(fm, path, &mut errors),
        source_url: string_field(fm, "source_url", path, &mut errors),
        source_url_line: fm.line_of("source_url"),
        body: parsed.body.to_string(),
        body_line: parsed.body_line,
    };
    ParseOutcome::new(Some(article), errors)
}
