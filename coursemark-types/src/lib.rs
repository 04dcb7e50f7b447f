//! Shared types for coursemark
//!
//! This crate holds the output contract of the content pipeline: the
//! flattened modules and courses a serving layer renders, and the
//! diagnostics an editor or CI job displays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Visibility tier of a content file, ordered from least to most restrictive.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ContentTier {
    #[default]
    Production,
    Wip,
    Ignored,
}

impl ContentTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentTier::Production => "production",
            ContentTier::Wip => "wip",
            ContentTier::Ignored => "ignored",
        }
    }

    /// Error category for diagnostics raised in a file of this tier
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            ContentTier::Production => Some(ErrorCategory::Production),
            ContentTier::Wip => Some(ErrorCategory::Wip),
            ContentTier::Ignored => None,
        }
    }
}

impl fmt::Display for ContentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Production,
    Wip,
}

/// A located problem found in the content.
///
/// Content errors are data: the pipeline collects them and keeps going.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentError {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ErrorCategory>,
}

impl ContentError {
    pub fn new(severity: Severity, file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            message: message.into(),
            suggestion: None,
            severity,
            category: None,
        }
    }

    pub fn error(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, file, message)
    }

    pub fn warning(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, file, message)
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn at(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_category(mut self, category: ErrorCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}: {}: {}", self.file, line, self.severity, self.message)?,
            None => write!(f, "{}: {}: {}", self.file, self.severity, self.message)?,
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Display metadata inlined from the lens source (article or video)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionKind {
    Page,
    LensArticle,
    LensVideo,
    // Legacy module blocks
    Text,
    Article,
    Video,
    Chat,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Page => "page",
            SectionKind::LensArticle => "lens-article",
            SectionKind::LensVideo => "lens-video",
            SectionKind::Text => "text",
            SectionKind::Article => "article",
            SectionKind::Video => "video",
            SectionKind::Chat => "chat",
        }
    }
}

/// A render-ready section of a flattened module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub meta: SectionMeta,
    pub segments: Vec<Segment>,
    pub optional: bool,
    pub content_id: Option<String>,
    pub learning_outcome_id: Option<String>,
}

impl Section {
    pub fn new(kind: SectionKind, meta: SectionMeta) -> Self {
        Self {
            kind,
            meta,
            segments: Vec::new(),
            optional: false,
            content_id: None,
            learning_outcome_id: None,
        }
    }

    /// Title for diagnostics, falling back to the section type
    pub fn label(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(self.kind.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Segment {
    Text {
        content: String,
    },
    ArticleExcerpt {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collapsed_before: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        collapsed_after: Option<String>,
    },
    VideoExcerpt {
        /// Start in seconds
        from: f64,
        /// End in seconds; `None` runs to the end of the transcript
        to: Option<f64>,
        transcript: String,
    },
    Chat {
        instructions: String,
        hide_previous_content_from_user: bool,
        hide_previous_content_from_tutor: bool,
    },
    Question {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assessment_instructions: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_chars: Option<u32>,
        enforce_voice: bool,
    },
}

impl Segment {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Segment::Text { .. } => "text",
            Segment::ArticleExcerpt { .. } => "article-excerpt",
            Segment::VideoExcerpt { .. } => "video-excerpt",
            Segment::Chat { .. } => "chat",
            Segment::Question { .. } => "question",
        }
    }

    /// The field a reader actually sees; it must never be blank
    pub fn primary_text(&self) -> &str {
        match self {
            Segment::Text { content } => content,
            Segment::ArticleExcerpt { content, .. } => content,
            Segment::VideoExcerpt { transcript, .. } => transcript,
            Segment::Chat { instructions, .. } => instructions,
            Segment::Question { content, .. } => content,
        }
    }

    pub fn primary_field(&self) -> &'static str {
        match self {
            Segment::VideoExcerpt { .. } => "transcript",
            Segment::Chat { .. } => "instructions",
            _ => "content",
        }
    }
}

/// A module with every lens and learning outcome reference inlined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedModule {
    pub slug: String,
    pub title: String,
    pub content_id: Option<String>,
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressionItem {
    Module {
        slug: String,
        #[serde(default)]
        optional: bool,
    },
    Meeting {
        number: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub slug: String,
    pub title: String,
    pub progression: Vec<ProgressionItem>,
}

impl Course {
    /// Slugs of the modules in progression order
    pub fn module_slugs(&self) -> Vec<&str> {
        self.progression
            .iter()
            .filter_map(|item| match item {
                ProgressionItem::Module { slug, .. } => Some(slug.as_str()),
                ProgressionItem::Meeting { .. } => None,
            })
            .collect()
    }
}

/// An external URL referenced by content, checked by a separate job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlToValidate {
    pub url: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub label: String,
}

/// Everything one pass over a content snapshot produces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResult {
    pub modules: Vec<FlattenedModule>,
    pub courses: Vec<Course>,
    pub errors: Vec<ContentError>,
    pub urls_to_validate: Vec<UrlToValidate>,
}

impl ProcessResult {
    pub fn error_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_warning()).count()
    }

    pub fn find_module(&self, slug: &str) -> Option<&FlattenedModule> {
        self.modules.iter().find(|m| m.slug == slug)
    }

    pub fn find_course(&self, slug: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.slug == slug)
    }
}
