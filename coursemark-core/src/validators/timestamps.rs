//! Pairing of video transcripts with their timestamp sidecars.

use crate::models::{sidecar_path_for, transcript_path_for, DocumentKind};
use crate::snapshot::FileSnapshot;
use crate::tiers::TierMap;
use coursemark_types::ContentError;

/// Every transcript needs a sidecar (error); every sidecar needs a
/// transcript (warning). Ignored transcripts are not checked.
pub fn validate_timestamp_pairs(files: &FileSnapshot, tiers: &TierMap) -> Vec<ContentError> {
    let mut errors = Vec::new();
    for path in files.paths() {
        match DocumentKind::from_path(path) {
            Some(DocumentKind::VideoTranscript) => {
                if tiers.is_ignored(path) {
                    continue;
                }
                let sidecar = sidecar_path_for(path);
                if !files.contains(&sidecar) {
                    errors.push(
                        ContentError::error(path, "Video transcript has no timestamps file")
                            .with_suggestion(format!("Add {}", sidecar)),
                    );
                }
            }
            Some(DocumentKind::TimestampSidecar) => {
                let transcript = transcript_path_for(path);
                if !files.contains(&transcript) {
                    errors.push(
                        ContentError::warning(path, "Timestamps file has no matching transcript")
                            .with_suggestion(format!("Add {} or delete this file", transcript)),
                    );
                }
            }
            _ => {}
        }
    }
    errors
}
