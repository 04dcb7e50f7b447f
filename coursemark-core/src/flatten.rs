//! Module flattening.
//!
//! Walks Module → Learning Outcome → Lens → Article/Video references and
//! produces one linear list of render-ready sections per module. Documents
//! are looked up by path in a read-only arena; every hop is tier-checked
//! before it is followed.

use crate::excerpt::{collapse_gaps, extract_article_excerpt, extract_video_excerpt};
use crate::models::{
    sidecar_path_for, ArticleDoc, Document, DocumentKind, LearningOutcomeDoc, LensDoc,
    LensSectionKind, LinkRef, ModuleBlock, ModuleDoc, SegmentSpec, TimestampEntry, VideoDoc,
};
use crate::snapshot::FileSnapshot;
use crate::tiers::{check_tier_violation, TierMap};
use crate::wikilinks::{lookup, Resolution};
use coursemark_types::{
    ContentError, ContentTier, FlattenedModule, Section, SectionKind, SectionMeta, Segment,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Everything the flattener reads; nothing in it is mutated
pub struct FlattenContext<'a> {
    pub files: &'a FileSnapshot,
    /// Parsed documents by snapshot path
    pub documents: &'a BTreeMap<String, Document>,
    pub tiers: &'a TierMap,
}

impl<'a> FlattenContext<'a> {
    pub fn new(
        files: &'a FileSnapshot,
        documents: &'a BTreeMap<String, Document>,
        tiers: &'a TierMap,
    ) -> Self {
        Self {
            files,
            documents,
            tiers,
        }
    }

    /// Timestamp entries from the sidecar paired with a transcript
    pub fn timestamps_for(&self, transcript_path: &str) -> Option<&'a [TimestampEntry]> {
        match self.documents.get(&sidecar_path_for(transcript_path)) {
            Some(Document::TimestampSidecar(sidecar)) => Some(&sidecar.entries),
            _ => None,
        }
    }
}

/// Flatten one module into render-ready sections
///
/// Returns the module and the problems found while resolving it. A module
/// that yields no sections gets its `error` set.
pub fn flatten_module(
    module: &ModuleDoc,
    ctx: &FlattenContext<'_>,
) -> (FlattenedModule, Vec<ContentError>) {
    let mut walk = Walk::new(ctx);
    let mut sections = Vec::new();

    for block in &module.blocks {
        match block {
            ModuleBlock::Page {
                title,
                id,
                optional,
                segments,
                ..
            } => {
                let mut section = Section::new(
                    SectionKind::Page,
                    SectionMeta {
                        title: non_empty(title),
                        ..SectionMeta::default()
                    },
                );
                section.segments = walk.segments(&module.path, segments, Sources::default());
                section.optional = *optional;
                section.content_id = id.clone();
                sections.push(section);
            }
            ModuleBlock::LearningOutcome {
                link,
                optional,
                line,
            } => {
                let Some(Document::LearningOutcome(lo)) =
                    walk.follow(&module.path, link, DocumentKind::LearningOutcome)
                else {
                    continue;
                };
                let before = sections.len();
                let lo_id = lo.id.as_ref().map(|id| id.value.as_str());
                for lens_ref in &lo.lenses {
                    if let Some(Document::Lens(lens)) =
                        walk.follow(&lo.path, &lens_ref.link, DocumentKind::Lens)
                    {
                        let optional = *optional || lens_ref.optional;
                        sections.extend(walk.lens_sections(lens, optional, lo_id));
                    }
                }
                if sections.len() == before {
                    walk.errors.push(
                        ContentError::warning(
                            &module.path,
                            format!("Learning outcome '{}' produced no content", lo.path),
                        )
                        .at_line(*line),
                    );
                }
            }
            ModuleBlock::Uncategorized { lenses, line } => {
                let before = sections.len();
                for lens_ref in lenses {
                    if let Some(Document::Lens(lens)) =
                        walk.follow(&module.path, &lens_ref.link, DocumentKind::Lens)
                    {
                        sections.extend(walk.lens_sections(lens, lens_ref.optional, None));
                    }
                }
                if sections.len() == before && !lenses.is_empty() {
                    walk.errors.push(
                        ContentError::warning(
                            &module.path,
                            "Uncategorized section produced no content",
                        )
                        .at_line(*line),
                    );
                }
            }
            ModuleBlock::LegacyText { content, .. } => {
                let mut section = Section::new(SectionKind::Text, SectionMeta::default());
                section.segments.push(Segment::Text {
                    content: content.clone(),
                });
                sections.push(section);
            }
            ModuleBlock::LegacyChat { chat, .. } => {
                let mut section = Section::new(SectionKind::Chat, SectionMeta::default());
                section.segments =
                    walk.segments(&module.path, std::slice::from_ref(chat), Sources::default());
                sections.push(section);
            }
            ModuleBlock::LegacyArticle {
                title,
                source,
                from,
                to,
                optional,
                line,
            } => {
                let Some(Document::Article(article)) =
                    walk.follow(&module.path, source, DocumentKind::Article)
                else {
                    continue;
                };
                let spec = SegmentSpec::ArticleExcerpt {
                    from: from.clone(),
                    to: to.clone(),
                    source: None,
                    line: *line,
                };
                let mut section =
                    Section::new(SectionKind::Article, article_meta(article, title.as_deref()));
                section.segments = walk.segments(&module.path, &[spec], Sources::article(article));
                section.optional = *optional;
                if !section.segments.is_empty() {
                    sections.push(section);
                }
            }
            ModuleBlock::LegacyVideo {
                title,
                source,
                from,
                to,
                optional,
                line,
            } => {
                let Some(Document::VideoTranscript(video)) =
                    walk.follow(&module.path, source, DocumentKind::VideoTranscript)
                else {
                    continue;
                };
                let spec = SegmentSpec::VideoExcerpt {
                    from: from.clone(),
                    to: to.clone(),
                    source: None,
                    line: *line,
                };
                let mut section =
                    Section::new(SectionKind::Video, video_meta(video, title.as_deref()));
                section.segments = walk.segments(&module.path, &[spec], Sources::video(video));
                section.optional = *optional;
                if !section.segments.is_empty() {
                    sections.push(section);
                }
            }
        }
    }

    let error = sections.is_empty().then(|| "Module produced no sections".to_string());
    if sections.is_empty() && !module.blocks.is_empty() {
        walk.errors.push(
            ContentError::warning(
                &module.path,
                format!("Module '{}' produced no sections", module.slug),
            )
            .with_suggestion("Check the errors above for the references it could not resolve"),
        );
    }
    debug!(
        module = %module.slug,
        sections = sections.len(),
        problems = walk.errors.len(),
        "Flattened module"
    );

    (
        FlattenedModule {
            slug: module.slug.clone(),
            title: module.title.clone(),
            content_id: module.id.as_ref().map(|id| id.value.clone()),
            sections,
            error,
            warnings: walk.notes,
        },
        walk.errors,
    )
}

/// Resolve a lens on its own, so lenses no module uses are still checked
pub fn validate_lens(lens: &LensDoc, ctx: &FlattenContext<'_>) -> Vec<ContentError> {
    let mut walk = Walk::new(ctx);
    walk.lens_sections(lens, false, None);
    walk.errors
}

/// Check the lens references of a learning outcome on its own
pub fn validate_learning_outcome(
    lo: &LearningOutcomeDoc,
    ctx: &FlattenContext<'_>,
) -> Vec<ContentError> {
    let mut walk = Walk::new(ctx);
    for lens_ref in &lo.lenses {
        walk.follow(&lo.path, &lens_ref.link, DocumentKind::Lens);
    }
    walk.errors
}

/// What an excerpt without its own `source::` cuts from
#[derive(Clone, Copy, Default)]
struct Sources<'c> {
    article: Option<&'c ArticleDoc>,
    video: Option<&'c VideoDoc>,
}

impl<'c> Sources<'c> {
    fn article(article: &'c ArticleDoc) -> Self {
        Self {
            article: Some(article),
            video: None,
        }
    }

    fn video(video: &'c VideoDoc) -> Self {
        Self {
            article: None,
            video: Some(video),
        }
    }

    /// Fill empty slots from `fallback`
    fn or(self, fallback: Sources<'c>) -> Self {
        Self {
            article: self.article.or(fallback.article),
            video: self.video.or(fallback.video),
        }
    }
}

/// One resolved article excerpt awaiting its collapsed text
struct ExcerptSpan<'c> {
    segment: usize,
    article: &'c ArticleDoc,
    start: usize,
    end: usize,
}

struct Walk<'c> {
    ctx: &'c FlattenContext<'c>,
    errors: Vec<ContentError>,
    /// Human-readable notes for the module's `warnings`
    notes: Vec<String>,
}

impl<'c> Walk<'c> {
    fn new(ctx: &'c FlattenContext<'c>) -> Self {
        Self {
            ctx,
            errors: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Resolve `link` from `parent` and return the target document
    ///
    /// Missing targets and tier violations are errors; ignored targets are
    /// skipped with a note.
    fn follow(
        &mut self,
        parent: &str,
        link: &LinkRef,
        expected: DocumentKind,
    ) -> Option<&'c Document> {
        let path = match lookup(&link.target, parent, self.ctx.files, Some(expected.directory())) {
            Resolution::Found(path) => path,
            Resolution::Missing {
                resolved,
                suggestion,
            } => {
                let mut error = ContentError::error(
                    parent,
                    format!("Referenced {} not found: {}", expected.label(), resolved),
                )
                .at_line(link.line);
                if let Some(suggestion) = suggestion {
                    error = error.with_suggestion(suggestion);
                }
                self.errors.push(error);
                return None;
            }
        };

        let child_tier = self.ctx.tiers.get(&path);
        if child_tier == ContentTier::Ignored {
            debug!(parent, child = %path, "Skipping ignored reference");
            self.notes
                .push(format!("Skipped ignored {} '{}'", expected.label(), path));
            return None;
        }
        if let Some(error) = check_tier_violation(
            parent,
            self.ctx.tiers.get(parent),
            &path,
            child_tier,
            expected.label(),
            Some(link.line),
        ) {
            self.errors.push(error);
            return None;
        }

        match self.ctx.documents.get(&path) {
            Some(doc) if doc.kind() == expected => Some(doc),
            Some(doc) => {
                self.errors.push(
                    ContentError::error(
                        parent,
                        format!(
                            "'{}' is a {}, not a {}",
                            path,
                            doc.kind().label(),
                            expected.label()
                        ),
                    )
                    .at_line(link.line),
                );
                None
            }
            None if DocumentKind::from_path(&path) == Some(expected) => {
                // Its own parse errors are already reported
                self.notes.push(format!(
                    "Skipped {} '{}', which could not be parsed",
                    expected.label(),
                    path
                ));
                None
            }
            None => {
                self.errors.push(
                    ContentError::error(
                        parent,
                        format!("'{}' is not a {} file", path, expected.label()),
                    )
                    .at_line(link.line)
                    .with_suggestion(format!(
                        "Link to a file under '{}/'",
                        expected.directory()
                    )),
                );
                None
            }
        }
    }

    /// Sections for one lens
    ///
    /// Section sources are resolved first; an excerpt that sits in a section
    /// of the other kind falls back to the lens's first source of its kind.
    fn lens_sections(
        &mut self,
        lens: &LensDoc,
        optional: bool,
        lo_id: Option<&str>,
    ) -> Vec<Section> {
        let mut resolved = Vec::with_capacity(lens.sections.len());
        let mut lens_sources = Sources::default();
        for lens_section in &lens.sections {
            let (kind, meta, own) = match lens_section.kind {
                LensSectionKind::Page => (
                    SectionKind::Page,
                    SectionMeta {
                        title: lens_section.title.clone(),
                        ..SectionMeta::default()
                    },
                    Sources::default(),
                ),
                LensSectionKind::Article => {
                    let Some(link) = &lens_section.source else {
                        continue;
                    };
                    let Some(Document::Article(article)) =
                        self.follow(&lens.path, link, DocumentKind::Article)
                    else {
                        continue;
                    };
                    (
                        SectionKind::LensArticle,
                        article_meta(article, lens_section.title.as_deref()),
                        Sources::article(article),
                    )
                }
                LensSectionKind::Video => {
                    let Some(link) = &lens_section.source else {
                        continue;
                    };
                    let Some(Document::VideoTranscript(video)) =
                        self.follow(&lens.path, link, DocumentKind::VideoTranscript)
                    else {
                        continue;
                    };
                    (
                        SectionKind::LensVideo,
                        video_meta(video, lens_section.title.as_deref()),
                        Sources::video(video),
                    )
                }
            };
            lens_sources = lens_sources.or(own);
            resolved.push((lens_section, kind, meta, own));
        }

        let mut sections = Vec::with_capacity(resolved.len());
        for (lens_section, kind, meta, own) in resolved {
            let mut section = Section::new(kind, meta);
            section.segments =
                self.segments(&lens.path, &lens_section.segments, own.or(lens_sources));
            section.optional = optional;
            section.content_id = lens.id.as_ref().map(|id| id.value.clone());
            section.learning_outcome_id = lo_id.map(str::to_string);
            sections.push(section);
        }
        sections
    }

    /// Turn segment specs into segments, resolving excerpts
    ///
    /// `sources` are what excerpts cut from by default; an excerpt with a
    /// `source::` of its own resolves against that instead.
    fn segments(
        &mut self,
        owner: &str,
        specs: &[SegmentSpec],
        sources: Sources<'c>,
    ) -> Vec<Segment> {
        let mut segments = Vec::with_capacity(specs.len());
        let mut spans: Vec<ExcerptSpan<'c>> = Vec::new();

        for spec in specs {
            match spec {
                SegmentSpec::Text { content, .. } => segments.push(Segment::Text {
                    content: content.clone(),
                }),
                SegmentSpec::Chat {
                    instructions,
                    hide_previous_content_from_user,
                    hide_previous_content_from_tutor,
                    ..
                } => segments.push(Segment::Chat {
                    instructions: instructions.clone(),
                    hide_previous_content_from_user: *hide_previous_content_from_user,
                    hide_previous_content_from_tutor: *hide_previous_content_from_tutor,
                }),
                SegmentSpec::Question {
                    content,
                    assessment_instructions,
                    max_time,
                    max_chars,
                    enforce_voice,
                    ..
                } => segments.push(Segment::Question {
                    content: content.clone(),
                    assessment_instructions: assessment_instructions.clone(),
                    max_time: max_time.clone(),
                    max_chars: *max_chars,
                    enforce_voice: *enforce_voice,
                }),
                SegmentSpec::ArticleExcerpt {
                    from,
                    to,
                    source: own,
                    line,
                } => {
                    let article = match (own, sources.article) {
                        (Some(link), _) => match self.follow(owner, link, DocumentKind::Article) {
                            Some(Document::Article(article)) => article,
                            _ => continue,
                        },
                        (None, Some(article)) => article,
                        (None, None) => {
                            self.unsourced(owner, "Article-excerpt", "article", *line);
                            continue;
                        }
                    };
                    let excerpt = extract_article_excerpt(
                        &article.body,
                        from.as_deref(),
                        to.as_deref(),
                        &article.path,
                    );
                    match excerpt {
                        Ok(excerpt) => {
                            spans.push(ExcerptSpan {
                                segment: segments.len(),
                                article,
                                start: excerpt.start,
                                end: excerpt.end,
                            });
                            segments.push(Segment::ArticleExcerpt {
                                content: excerpt.content,
                                collapsed_before: None,
                                collapsed_after: None,
                            });
                        }
                        Err(e) => self.errors.push(
                            ContentError::error(owner, e.to_string())
                                .at_line(*line)
                                .with_suggestion(format!(
                                    "Copy the anchor text exactly as it appears in {}",
                                    article.path
                                )),
                        ),
                    }
                }
                SegmentSpec::VideoExcerpt {
                    from,
                    to,
                    source: own,
                    line,
                } => {
                    let video = match (own, sources.video) {
                        (Some(link), _) => {
                            match self.follow(owner, link, DocumentKind::VideoTranscript) {
                                Some(Document::VideoTranscript(video)) => video,
                                _ => continue,
                            }
                        }
                        (None, Some(video)) => video,
                        (None, None) => {
                            self.unsourced(owner, "Video-excerpt", "video", *line);
                            continue;
                        }
                    };
                    let excerpt = extract_video_excerpt(
                        &video.body,
                        from.as_deref(),
                        to.as_deref(),
                        &video.path,
                        self.ctx.timestamps_for(&video.path),
                    );
                    match excerpt {
                        Ok(excerpt) => segments.push(Segment::VideoExcerpt {
                            from: excerpt.from,
                            to: excerpt.to,
                            transcript: excerpt.transcript,
                        }),
                        Err(e) => self
                            .errors
                            .push(ContentError::error(owner, e.to_string()).at_line(*line)),
                    }
                }
            }
        }

        apply_collapsed(&mut segments, &spans);
        segments
    }

    /// An excerpt with nothing to cut from is left out with a warning
    fn unsourced(&mut self, owner: &str, segment: &str, source: &str, line: usize) {
        self.notes.push(format!(
            "Left out {} at {}:{}, which has no {} to excerpt from",
            segment, owner, line, source
        ));
        self.errors.push(
            ContentError::warning(
                owner,
                format!("{} segment has no {} to excerpt from", segment, source),
            )
            .at_line(line)
            .with_suggestion(format!(
                "Add a {} section to the lens or give the segment its own 'source::'",
                source
            )),
        );
    }
}

/// Fill in collapsed text for excerpts, grouped by the article they cut
///
/// Gaps follow source order, whatever order the excerpts appear in.
fn apply_collapsed(segments: &mut [Segment], spans: &[ExcerptSpan<'_>]) {
    let mut by_article: BTreeMap<&str, Vec<&ExcerptSpan<'_>>> = BTreeMap::new();
    for span in spans {
        by_article.entry(span.article.path.as_str()).or_default().push(span);
    }
    for group in by_article.values() {
        let ranges: Vec<(usize, usize)> = group.iter().map(|s| (s.start, s.end)).collect();
        let gaps = collapse_gaps(&group[0].article.body, &ranges);
        for (span, (before, after)) in group.iter().zip(gaps) {
            if let Some(Segment::ArticleExcerpt {
                collapsed_before,
                collapsed_after,
                ..
            }) = segments.get_mut(span.segment)
            {
                *collapsed_before = before;
                *collapsed_after = after;
            }
        }
    }
}

fn article_meta(article: &ArticleDoc, fallback_title: Option<&str>) -> SectionMeta {
    SectionMeta {
        title: article
            .title
            .clone()
            .or_else(|| fallback_title.map(str::to_string)),
        author: article.author.clone(),
        channel: None,
        source_url: article.source_url.clone(),
    }
}

fn video_meta(video: &VideoDoc, fallback_title: Option<&str>) -> SectionMeta {
    SectionMeta {
        title: video
            .title
            .clone()
            .or_else(|| fallback_title.map(str::to_string)),
        author: None,
        channel: video.channel.clone(),
        source_url: video.url.clone(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
