//! Article excerpts bounded by anchor text.
//!
//! An excerpt runs from the first occurrence of its `from` anchor through the
//! end of the first occurrence of its `to` anchor after it. Both anchors are
//! part of the excerpt, so `before + content + after` is always the source.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Start anchor \"{anchor}\" not found in {source_path}")]
    FromNotFound { anchor: String, source_path: String },

    #[error("End anchor \"{anchor}\" not found in {source_path}")]
    ToNotFound { anchor: String, source_path: String },

    #[error("End anchor \"{anchor}\" appears before the start anchor in {source_path}")]
    ToBeforeFrom { anchor: String, source_path: String },
}

/// A slice of an article plus the material on either side of it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleExcerpt {
    pub content: String,
    pub before: String,
    pub after: String,
    /// Byte range of `content` in the source
    pub start: usize,
    pub end: usize,
}

/// Cut an excerpt out of `source`
///
/// A missing `from` starts at the beginning of the source and a missing `to`
/// runs to the end.
///
/// # Example
///
/// ```
/// use coursemark_core::excerpt::extract_article_excerpt;
///
/// let source = "Intro. START of the part END. Outro.";
/// let excerpt = extract_article_excerpt(source, Some("START"), Some("END"), "articles/a.md").unwrap();
/// assert_eq!(excerpt.content, "START of the part END");
/// assert_eq!(format!("{}{}{}", excerpt.before, excerpt.content, excerpt.after), source);
/// ```
pub fn extract_article_excerpt(
    source: &str,
    from: Option<&str>,
    to: Option<&str>,
    source_path: &str,
) -> Result<ArticleExcerpt, AnchorError> {
    let (start, from_end) = match from {
        Some(anchor) => find_anchor(source, anchor, 0).ok_or_else(|| AnchorError::FromNotFound {
            anchor: anchor.to_string(),
            source_path: source_path.to_string(),
        })?,
        None => (0, 0),
    };

    let end = match to {
        Some(anchor) => match find_anchor(source, anchor, from_end) {
            Some((_, end)) => end,
            None if find_anchor(source, anchor, 0).is_some() => {
                return Err(AnchorError::ToBeforeFrom {
                    anchor: anchor.to_string(),
                    source_path: source_path.to_string(),
                })
            }
            None => {
                return Err(AnchorError::ToNotFound {
                    anchor: anchor.to_string(),
                    source_path: source_path.to_string(),
                })
            }
        },
        None => source.len(),
    };

    Ok(ArticleExcerpt {
        content: source[start..end].to_string(),
        before: source[..start].to_string(),
        after: source[end..].to_string(),
        start,
        end,
    })
}

/// Byte range of the first match of `anchor` at or after `offset`
///
/// Tries an exact match first. Failing that, matches ignoring case,
/// whitespace runs, `*`/`_` emphasis markers and curly quote/dash variants,
/// and maps the match back to a range in the original text.
pub fn find_anchor(haystack: &str, anchor: &str, offset: usize) -> Option<(usize, usize)> {
    let anchor = anchor.trim();
    if anchor.is_empty() || offset > haystack.len() || !haystack.is_char_boundary(offset) {
        return None;
    }
    if let Some(pos) = haystack[offset..].find(anchor) {
        let start = offset + pos;
        return Some((start, start + anchor.len()));
    }

    let needle: Vec<char> = normalize(anchor).into_iter().map(|(c, _, _)| c).collect();
    let needle = trim_spaces(&needle);
    if needle.is_empty() {
        return None;
    }

    let hay = normalize(&haystack[offset..]);
    if hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len())
        .find(|&i| hay[i..i + needle.len()].iter().map(|(c, _, _)| *c).eq(needle.iter().copied()))
        .map(|i| {
            let (_, start, _) = hay[i];
            let (_, _, end) = hay[i + needle.len() - 1];
            (offset + start, offset + end)
        })
}

/// Normalized characters with the byte range each came from
fn normalize(text: &str) -> Vec<(char, usize, usize)> {
    let mut out: Vec<(char, usize, usize)> = Vec::with_capacity(text.len());
    for (pos, c) in text.char_indices() {
        let end = pos + c.len_utf8();
        let folded = match c {
            '*' | '_' => continue,
            '\u{2018}' | '\u{2019}' | '\u{201B}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2010}'..='\u{2015}' => '-',
            '\u{00A0}' => ' ',
            c if c.is_whitespace() => ' ',
            c => c,
        };
        if folded == ' ' {
            if let Some(last) = out.last_mut().filter(|(c, _, _)| *c == ' ') {
                last.2 = end;
                continue;
            }
        }
        for lower in folded.to_lowercase() {
            out.push((lower, pos, end));
        }
    }
    out
}

fn trim_spaces(chars: &[char]) -> &[char] {
    let start = chars.iter().position(|c| *c != ' ').unwrap_or(chars.len());
    let end = chars.iter().rposition(|c| *c != ' ').map_or(start, |i| i + 1);
    &chars[start..end]
}

/// Collapsed text around several excerpts of one source
///
/// Spans may come in any order; gaps are worked out in source order and
/// returned in the order given. The excerpt that starts first keeps the text
/// before it. Each excerpt's trailing text runs from the furthest end seen so
/// far up to the start of the next excerpt, or to the end of the source for
/// the last one. Blank gaps become `None`.
pub fn collapse_gaps(
    source: &str,
    spans: &[(usize, usize)],
) -> Vec<(Option<String>, Option<String>)> {
    let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
    let mut order: Vec<usize> = (0..spans.len()).collect();
    order.sort_by_key(|&i| spans[i]);

    let mut gaps = vec![(None, None); spans.len()];
    let mut reach = 0;
    for (k, &i) in order.iter().enumerate() {
        let (start, end) = spans[i];
        if k == 0 {
            gaps[i].0 = source.get(..start).and_then(non_blank);
        }
        reach = reach.max(end);
        let next_start = order.get(k + 1).map_or(source.len(), |&j| spans[j].0);
        if next_start > reach {
            gaps[i].1 = source.get(reach..next_start).and_then(non_blank);
        }
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "# Title\n\nPreamble text.\n\nSTART here is the body of the excerpt END and then more.\n";

    #[test]
    fn test_round_trip() {
        let excerpt =
            extract_article_excerpt(SOURCE, Some("START"), Some("END"), "articles/a.md").unwrap();
        assert!(excerpt.content.starts_with("START"));
        assert!(excerpt.content.ends_with("END"));
        assert_eq!(
            format!("{}{}{}", excerpt.before, excerpt.content, excerpt.after),
            SOURCE
        );
    }

    #[test]
    fn test_open_ended_ranges() {
        let excerpt = extract_article_excerpt(SOURCE, None, Some("Preamble text."), "a").unwrap();
        assert_eq!(excerpt.before, "");
        assert!(excerpt.content.ends_with("Preamble text."));

        let excerpt = extract_article_excerpt(SOURCE, Some("START"), None, "a").unwrap();
        assert_eq!(excerpt.after, "");
        assert_eq!(excerpt.end, SOURCE.len());
    }

    #[test]
    fn test_first_occurrence_is_used() {
        let source = "one marker two marker three";
        let excerpt = extract_article_excerpt(source, Some("marker"), None, "a").unwrap();
        assert_eq!(excerpt.before, "one ");
    }

    #[test]
    fn test_to_is_searched_after_from() {
        let source = "END early. START middle END late.";
        let excerpt = extract_article_excerpt(source, Some("START"), Some("END"), "a").unwrap();
        assert_eq!(excerpt.content, "START middle END");
    }

    #[test]
    fn test_missing_anchors() {
        let err =
            extract_article_excerpt(SOURCE, Some("nowhere"), None, "articles/a.md").unwrap_err();
        assert!(matches!(err, AnchorError::FromNotFound { .. }));
        assert_eq!(
            err.to_string(),
            "Start anchor \"nowhere\" not found in articles/a.md"
        );

        let err = extract_article_excerpt(SOURCE, Some("START"), Some("nowhere"), "a").unwrap_err();
        assert!(matches!(err, AnchorError::ToNotFound { .. }));

        let err =
            extract_article_excerpt(SOURCE, Some("START"), Some("Preamble"), "a").unwrap_err();
        assert!(matches!(err, AnchorError::ToBeforeFrom { .. }));
    }

    #[test]
    fn test_fuzzy_match_maps_back_to_source() {
        let source = "Some text. It\u{2019}s   a *very* Important idea, he said.";
        let (start, end) = find_anchor(source, "it's a very important idea", 0).unwrap();
        assert_eq!(&source[start..end], "It\u{2019}s   a *very* Important idea");
    }

    #[test]
    fn test_fuzzy_respects_offset() {
        let source = "Alpha beta. ALPHA BETA.";
        let (start, _) = find_anchor(source, "alpha beta", 5).unwrap();
        assert_eq!(start, 12);
    }

    #[test]
    fn test_empty_anchor_never_matches() {
        assert_eq!(find_anchor("abc", "   ", 0), None);
    }

    #[test]
    fn test_collapse_gaps() {
        let source = "aaa XX bbb YY ccc";
        let spans = [(4, 6), (11, 13)];
        let gaps = collapse_gaps(source, &spans);
        assert_eq!(gaps[0], (Some("aaa ".to_string()), Some(" bbb ".to_string())));
        assert_eq!(gaps[1], (None, Some(" ccc".to_string())));
    }

    #[test]
    fn test_collapse_gaps_blank_and_overlap() {
        let source = "XX YY";
        let gaps = collapse_gaps(source, &[(0, 2), (1, 5)]);
        assert_eq!(gaps[0], (None, None));
        assert_eq!(gaps[1], (None, None));
    }

    #[test]
    fn test_collapse_gaps_follow_source_order() {
        let source = "First part. Second part. Third part.\n";
        let gaps = collapse_gaps(source, &[(25, 36), (0, 11)]);
        assert_eq!(gaps[0], (None, None));
        assert_eq!(gaps[1], (None, Some(" Second part. ".to_string())));
    }

    #[test]
    fn test_collapse_gaps_skip_text_inside_earlier_excerpt() {
        let source = "aaa bbb ccc ddd";
        let gaps = collapse_gaps(source, &[(0, 11), (4, 7)]);
        assert_eq!(gaps[0], (None, None));
        assert_eq!(gaps[1], (None, Some(" ddd".to_string())));
    }
}
