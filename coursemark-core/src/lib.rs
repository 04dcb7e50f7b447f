//! # coursemark-core
//!
//! Content resolution pipeline for coursemark knowledge bases.
//!
//! This crate turns a snapshot of markdown content (modules, courses, lenses,
//! learning outcomes, articles and video transcripts) into flattened,
//! render-ready modules plus a complete list of content errors.

pub mod config;
pub mod excerpt;
pub mod fields;
pub mod flatten;
pub mod frontmatter;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod slug;
pub mod snapshot;
pub mod tiers;
pub mod urls;
pub mod validators;
pub mod wikilinks;

pub use config::Config;
pub use coursemark_types::{
    ContentError, ContentTier, Course, ErrorCategory, FlattenedModule, ProcessResult,
    ProgressionItem, Section, SectionKind, SectionMeta, Segment, Severity, UrlToValidate,
};
pub use models::{Document, DocumentKind, ParseOutcome};
pub use pipeline::process_content;
pub use slug::slugify;
pub use snapshot::FileSnapshot;
pub use tiers::{check_tier_violation, classify_tiers, TierMap};
