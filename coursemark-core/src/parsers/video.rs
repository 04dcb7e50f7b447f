//! Video transcript documents (`video_transcripts/**/*.md`).

use super::{id_field, read_frontmatter, string_field};
use crate::models::{ParseOutcome, VideoDoc};

pub fn parse_video_transcript(content: &str, path: &str) -> ParseOutcome<VideoDoc> {
    let mut errors = Vec::new();
    let Some(parsed) = read_frontmatter(content, path, &mut errors) else {
        return ParseOutcome::failed(errors);
    };
    let fm = &parsed.frontmatter;

    let video = VideoDoc {
        path: path.to_string(),
        id: id_field(fm, path, false, &mut errors),
        title: string_field(fm, "title", path, &mut errors),
        channel: string_field(fm, "channel", path, &mut errors),
        url: string_field(fm, "url", path, &mut errors),
        url_line: fm.line_of("url"),
        body: parsed.body.to_string(),
    };
    ParseOutcome::new(Some(video), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_transcript() {
        let content = "---\ntitle: Intro to alignment\nchannel: Robert Miles\nurl: https://www.youtube.com/watch?v=abc\n---\nHello and welcome.\n";
        let outcome = parse_video_transcript(content, "video_transcripts/intro.md");
        assert!(outcome.errors.is_empty());
        let video = outcome.document.unwrap();
        assert_eq!(video.channel.as_deref(), Some("Robert Miles"));
        assert_eq!(video.url_line, Some(4));
    }

    #[test]
    fn test_numeric_title_is_type_error() {
        let outcome = parse_video_transcript("---\ntitle: 2024\n---\n", "video_transcripts/v.md");
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.document.unwrap().title.is_none());
    }
}
