//! Slug normalization for module and course identifiers.

use unicode_segmentation::UnicodeSegmentation;

/// Convert a string to a URL-safe slug
///
/// Lowercases, maps whitespace and underscores to hyphens, drops punctuation,
/// collapses hyphen runs and trims hyphens from both ends. Alphabetic
/// graphemes outside ASCII are kept.
///
/// # Examples
///
/// ```
/// use coursemark_core::slugify;
///
/// assert_eq!(slugify("Intro to AI Safety"), "intro-to-ai-safety");
/// assert_eq!(slugify("week_02: Risks!"), "week-02-risks");
/// ```
pub fn slugify(input: &str) -> String {
    let lowercased = input.to_lowercase();
    let mut slug = String::with_capacity(lowercased.len());

    for grapheme in lowercased.graphemes(true) {
        let Some(c) = grapheme.chars().next() else {
            continue;
        };
        let piece = if c.is_whitespace() || c == '_' || c == '-' {
            "-"
        } else if c.is_ascii_alphanumeric() || c.is_alphabetic() {
            grapheme
        } else {
            continue;
        };

        if piece == "-" && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push_str(piece);
    }

    slug.trim_end_matches('-').to_string()
}

/// Suggest a corrected slug when `slug` is not already URL-safe
pub fn suggest_slug(slug: &str) -> Option<String> {
    let normalized = slugify(slug);
    (normalized != slug && !normalized.is_empty()).then_some(normalized)
}
