//! Near-miss top-level directory names (`lenses/` for `Lenses/`).

use crate::models::CONTENT_DIRECTORIES;
use crate::snapshot::FileSnapshot;
use crate::wikilinks::suggestion_threshold;
use coursemark_types::ContentError;
use std::collections::BTreeSet;

/// One warning per unknown top-level directory that is close to a content
/// directory. Unrelated directories (assets, scripts) are left alone.
pub fn validate_directories(files: &FileSnapshot) -> Vec<ContentError> {
    let mut seen = BTreeSet::new();
    let mut errors = Vec::new();

    for path in files.paths() {
        let Some((dir, _)) = path.split_once('/') else {
            continue;
        };
        if !seen.insert(dir) || CONTENT_DIRECTORIES.iter().any(|(known, _)| *known == dir) {
            continue;
        }
        if let Some(known) = closest_directory(dir) {
            errors.push(
                ContentError::warning(
                    path,
                    format!("Directory '{}/' is not a content directory", dir),
                )
                .with_suggestion(format!("Did you mean '{}/'?", known)),
            );
        }
    }
    errors
}

fn closest_directory(dir: &str) -> Option<&'static str> {
    let lower = dir.to_lowercase();
    CONTENT_DIRECTORIES
        .iter()
        .map(|(known, _)| (strsim::levenshtein(&lower, &known.to_lowercase()), *known))
        .filter(|(distance, known)| *distance <= suggestion_threshold(known))
        .min()
        .map(|(_, known)| known)
}
