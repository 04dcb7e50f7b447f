//! Excerpt extraction from articles (by anchor text) and video transcripts
//! (by time range).

pub mod article;
pub mod video;

pub use article::{collapse_gaps, extract_article_excerpt, find_anchor, AnchorError, ArticleExcerpt};
pub use video::{
    extract_video_excerpt, format_timestamp, parse_timestamp, VideoExcerpt, VideoExcerptError,
};
