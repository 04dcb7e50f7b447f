//! External URLs collected for an out-of-band link checker.

use crate::models::Document;
use coursemark_types::UrlToValidate;
use pulldown_cmark::{Event, Options, Parser, Tag};

/// Collect article sources, article image links and video sources
///
/// Only http(s) URLs are reported; nothing is fetched here.
pub fn collect_urls<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Vec<UrlToValidate> {
    let mut urls = Vec::new();
    for document in documents {
        match document {
            Document::Article(article) => {
                if let Some(url) = &article.source_url {
                    urls.push(UrlToValidate {
                        url: url.clone(),
                        file: article.path.clone(),
                        line: article.source_url_line,
                        label: "article source".to_string(),
                    });
                }
                for (url, offset) in image_urls(&article.body) {
                    let line = article.body_line + article.body[..offset].matches('\n').count();
                    urls.push(UrlToValidate {
                        url,
                        file: article.path.clone(),
                        line: Some(line),
                        label: "article image".to_string(),
                    });
                }
            }
            Document::VideoTranscript(video) => {
                if let Some(url) = &video.url {
                    urls.push(UrlToValidate {
                        url: url.clone(),
                        file: video.path.clone(),
                        line: video.url_line,
                        label: "video source".to_string(),
                    });
                }
            }
            _ => {}
        }
    }
    urls
}

fn is_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Image destinations with the byte offset of the image in `body`
fn image_urls(body: &str) -> Vec<(String, usize)> {
    Parser::new_ext(body, Options::empty())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Image { dest_url, .. }) if is_http(&dest_url) => {
                Some((dest_url.into_string(), range.start))
            }
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleDoc, VideoDoc};

    #[test]
    fn test_collects_sources_and_images() {
        let article = Document::Article(ArticleDoc {
            path: "articles/a.md".into(),
            id: None,
            title: Some("A".into()),
            author: None,
            source_url: Some("https://example.com/a".into()),
            source_url_line: Some(3),
            body: "Intro.\n\n![chart](https://example.com/c.png)\n\n![local](img/d.png)\n".into(),
            body_line: 6,
        });
        let video = Document::VideoTranscript(VideoDoc {
            path: "video_transcripts/v.md".into(),
            id: None,
            title: None,
            channel: None,
            url: Some("https://youtube.com/watch?v=x".into()),
            url_line: Some(2),
            body: String::new(),
        });

        let urls = collect_urls([&article, &video]);
        assert_eq!(urls.len(), 3);
        assert_eq!(urls[0].label, "article source");
        assert_eq!(urls[0].line, Some(3));
        assert_eq!(urls[1].url, "https://example.com/c.png");
        assert_eq!(urls[1].line, Some(8));
        assert_eq!(urls[2].label, "video source");
    }
}
