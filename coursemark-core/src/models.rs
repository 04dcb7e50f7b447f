//! Parsed document models.
//!
//! Every content file is parsed into one of a closed set of typed documents.
//! Cross-file references stay as unresolved [`LinkRef`]s; the flattener
//! resolves them through the snapshot by path, never through pointers.

use coursemark_types::ContentError;

/// Kind of document, decided by path convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    Module,
    Course,
    LearningOutcome,
    Lens,
    Article,
    VideoTranscript,
    TimestampSidecar,
}

/// Top-level directories holding content, with the document kind each holds
pub const CONTENT_DIRECTORIES: &[(&str, DocumentKind)] = &[
    ("modules", DocumentKind::Module),
    ("courses", DocumentKind::Course),
    ("Learning Outcomes", DocumentKind::LearningOutcome),
    ("Lenses", DocumentKind::Lens),
    ("articles", DocumentKind::Article),
    ("video_transcripts", DocumentKind::VideoTranscript),
];

pub const TIMESTAMPS_SUFFIX: &str = ".timestamps.json";

impl DocumentKind {
    /// Classify a snapshot path; `None` for files the pipeline does not read
    pub fn from_path(path: &str) -> Option<Self> {
        let (dir, rest) = path.split_once('/')?;
        let kind = CONTENT_DIRECTORIES
            .iter()
            .find(|(name, _)| *name == dir)
            .map(|(_, kind)| *kind)?;

        match kind {
            DocumentKind::VideoTranscript if rest.ends_with(TIMESTAMPS_SUFFIX) => {
                Some(DocumentKind::TimestampSidecar)
            }
            // Modules and courses are flat directories
            DocumentKind::Module | DocumentKind::Course if rest.contains('/') => None,
            _ if path.ends_with(".md") => Some(kind),
            _ => None,
        }
    }

    /// Directory where files of this kind live
    pub fn directory(&self) -> &'static str {
        match self {
            DocumentKind::Module => "modules",
            DocumentKind::Course => "courses",
            DocumentKind::LearningOutcome => "Learning Outcomes",
            DocumentKind::Lens => "Lenses",
            DocumentKind::Article => "articles",
            DocumentKind::VideoTranscript | DocumentKind::TimestampSidecar => "video_transcripts",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Module => "module",
            DocumentKind::Course => "course",
            DocumentKind::LearningOutcome => "learning outcome",
            DocumentKind::Lens => "lens",
            DocumentKind::Article => "article",
            DocumentKind::VideoTranscript => "video transcript",
            DocumentKind::TimestampSidecar => "timestamps file",
        }
    }
}

/// Result of parsing one file: a best-effort document plus diagnostics
#[derive(Debug, Clone)]
pub struct ParseOutcome<T> {
    pub document: Option<T>,
    pub errors: Vec<ContentError>,
}

impl<T> ParseOutcome<T> {
    pub fn new(document: Option<T>, errors: Vec<ContentError>) -> Self {
        Self { document, errors }
    }

    pub fn failed(errors: Vec<ContentError>) -> Self {
        Self {
            document: None,
            errors,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ParseOutcome<U> {
        ParseOutcome {
            document: self.document.map(f),
            errors: self.errors,
        }
    }
}

/// An unresolved reference to another file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRef {
    /// Link target as written, label stripped
    pub target: String,
    pub label: Option<String>,
    pub line: usize,
}

/// An `id` value together with where it was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdField {
    pub value: String,
    /// Field name, e.g. "id" or "page id"
    pub field: &'static str,
    pub line: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SegmentSpec {
    Text {
        content: String,
        line: usize,
    },
    Chat {
        instructions: String,
        hide_previous_content_from_user: bool,
        hide_previous_content_from_tutor: bool,
        line: usize,
    },
    Question {
        content: String,
        assessment_instructions: Option<String>,
        max_time: Option<String>,
        max_chars: Option<u32>,
        enforce_voice: bool,
        line: usize,
    },
    ArticleExcerpt {
        from: Option<String>,
        to: Option<String>,
        /// Per-segment source overriding the section's source
        source: Option<LinkRef>,
        line: usize,
    },
    VideoExcerpt {
        from: Option<String>,
        to: Option<String>,
        source: Option<LinkRef>,
        line: usize,
    },
}

impl SegmentSpec {
    pub fn line(&self) -> usize {
        match self {
            SegmentSpec::Text { line, .. }
            | SegmentSpec::Chat { line, .. }
            | SegmentSpec::Question { line, .. }
            | SegmentSpec::ArticleExcerpt { line, .. }
            | SegmentSpec::VideoExcerpt { line, .. } => *line,
        }
    }
}

/// A lens reference with its `optional::` flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensRef {
    pub link: LinkRef,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleBlock {
    Page {
        title: String,
        id: Option<String>,
        optional: bool,
        segments: Vec<SegmentSpec>,
        line: usize,
    },
    LearningOutcome {
        link: LinkRef,
        optional: bool,
        line: usize,
    },
    Uncategorized {
        lenses: Vec<LensRef>,
        line: usize,
    },
    LegacyText {
        content: String,
        line: usize,
    },
    LegacyChat {
        chat: SegmentSpec,
        line: usize,
    },
    LegacyArticle {
        title: Option<String>,
        source: LinkRef,
        from: Option<String>,
        to: Option<String>,
        optional: bool,
        line: usize,
    },
    LegacyVideo {
        title: Option<String>,
        source: LinkRef,
        from: Option<String>,
        to: Option<String>,
        optional: bool,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDoc {
    pub path: String,
    pub slug: String,
    pub slug_line: Option<usize>,
    pub title: String,
    pub id: Option<IdField>,
    pub blocks: Vec<ModuleBlock>,
}

impl ModuleDoc {
    /// Every id written in the module: the frontmatter id and page ids
    pub fn ids(&self) -> Vec<IdField> {
        let mut ids: Vec<IdField> = self.id.iter().cloned().collect();
        for block in &self.blocks {
            if let ModuleBlock::Page {
                id: Some(id), line, ..
            } = block
            {
                ids.push(IdField {
                    value: id.clone(),
                    field: "page id",
                    line: Some(*line),
                });
            }
        }
        ids
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseItemSpec {
    Module { link: LinkRef, optional: bool },
    Meeting { number: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDoc {
    pub path: String,
    pub slug: String,
    pub slug_line: Option<usize>,
    pub title: String,
    pub items: Vec<CourseItemSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningOutcomeDoc {
    pub path: String,
    pub id: Option<IdField>,
    pub statement: Option<String>,
    pub lenses: Vec<LensRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensSectionKind {
    Page,
    Article,
    Video,
}

impl LensSectionKind {
    pub fn label(&self) -> &'static str {
        match self {
            LensSectionKind::Page => "Page",
            LensSectionKind::Article => "Article",
            LensSectionKind::Video => "Video",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LensSection {
    pub kind: LensSectionKind,
    pub title: Option<String>,
    pub source: Option<LinkRef>,
    pub segments: Vec<SegmentSpec>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LensDoc {
    pub path: String,
    pub id: Option<IdField>,
    pub sections: Vec<LensSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDoc {
    pub path: String,
    pub id: Option<IdField>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub source_url: Option<String>,
    pub source_url_line: Option<usize>,
    /// Markdown body after frontmatter; excerpts are cut from this text
    pub body: String,
    pub body_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoDoc {
    pub path: String,
    pub id: Option<IdField>,
    pub title: Option<String>,
    pub channel: Option<String>,
    pub url: Option<String>,
    pub url_line: Option<usize>,
    pub body: String,
}

/// One timed chunk of a transcript
#[derive(Debug, Clone, PartialEq)]
pub struct TimestampEntry {
    pub text: String,
    /// Start in seconds
    pub start: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimestampSidecar {
    pub path: String,
    pub entries: Vec<TimestampEntry>,
}

impl TimestampSidecar {
    /// Path of the transcript markdown this sidecar belongs to
    pub fn transcript_path(&self) -> String {
        transcript_path_for(&self.path)
    }
}

/// `video_transcripts/x.timestamps.json` -> `video_transcripts/x.md`
pub fn transcript_path_for(sidecar_path: &str) -> String {
    let stem = sidecar_path
        .strip_suffix(TIMESTAMPS_SUFFIX)
        .unwrap_or(sidecar_path);
    format!("{stem}.md")
}

/// `video_transcripts/x.md` -> `video_transcripts/x.timestamps.json`
pub fn sidecar_path_for(transcript_path: &str) -> String {
    let stem = transcript_path
        .strip_suffix(".md")
        .unwrap_or(transcript_path);
    format!("{stem}{TIMESTAMPS_SUFFIX}")
}

/// A parsed content file
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Module(ModuleDoc),
    Course(CourseDoc),
    LearningOutcome(LearningOutcomeDoc),
    Lens(LensDoc),
    Article(ArticleDoc),
    VideoTranscript(VideoDoc),
    TimestampSidecar(TimestampSidecar),
}

impl Document {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Document::Module(_) => DocumentKind::Module,
            Document::Course(_) => DocumentKind::Course,
            Document::LearningOutcome(_) => DocumentKind::LearningOutcome,
            Document::Lens(_) => DocumentKind::Lens,
            Document::Article(_) => DocumentKind::Article,
            Document::VideoTranscript(_) => DocumentKind::VideoTranscript,
            Document::TimestampSidecar(_) => DocumentKind::TimestampSidecar,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Document::Module(d) => &d.path,
            Document::Course(d) => &d.path,
            Document::LearningOutcome(d) => &d.path,
            Document::Lens(d) => &d.path,
            Document::Article(d) => &d.path,
            Document::VideoTranscript(d) => &d.path,
            Document::TimestampSidecar(d) => &d.path,
        }
    }

    /// Ids written in this document, for the UUID registry
    pub fn ids(&self) -> Vec<IdField> {
        match self {
            Document::Module(d) => d.ids(),
            Document::LearningOutcome(d) => d.id.iter().cloned().collect(),
            Document::Lens(d) => d.id.iter().cloned().collect(),
            Document::Article(d) => d.id.iter().cloned().collect(),
            Document::VideoTranscript(d) => d.id.iter().cloned().collect(),
            Document::Course(_) | Document::TimestampSidecar(_) => Vec::new(),
        }
    }
}
