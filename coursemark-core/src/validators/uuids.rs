//! UUID format and uniqueness.

use coursemark_types::ContentError;
use std::collections::BTreeMap;
use uuid::Uuid;

/// An id written somewhere in the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UuidEntry {
    pub uuid: String,
    pub file: String,
    /// Field the id came from, e.g. "id" or "page id"
    pub field: String,
    pub line: Option<usize>,
}

const NEW_ID_SUGGESTION: &str = "Generate a fresh UUID, e.g. with `uuidgen`";

/// Hyphenated 8-4-4-4-12 form
pub fn is_valid_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::parse_str(value).is_ok()
}

/// Flag malformed ids and ids used more than once
///
/// Comparison ignores case. Every use after the first is an error naming
/// where the id was first seen, including repeats inside one file.
pub fn validate_uuids(entries: &[UuidEntry]) -> Vec<ContentError> {
    let mut errors = Vec::new();
    let mut first_seen: BTreeMap<String, &UuidEntry> = BTreeMap::new();

    for entry in entries {
        if !is_valid_uuid(&entry.uuid) {
            errors.push(
                ContentError::error(
                    &entry.file,
                    format!("Invalid UUID '{}' in '{}'", entry.uuid, entry.field),
                )
                .at(entry.line)
                .with_suggestion(NEW_ID_SUGGESTION),
            );
            continue;
        }

        let key = entry.uuid.to_ascii_lowercase();
        match first_seen.get(&key) {
            Some(first) => {
                let location = if first.file == entry.file {
                    format!("'{}' in this file", first.field)
                } else {
                    first.file.clone()
                };
                errors.push(
                    ContentError::error(
                        &entry.file,
                        format!("Duplicate UUID '{}' (also used by {})", entry.uuid, location),
                    )
                    .at(entry.line)
                    .with_suggestion(NEW_ID_SUGGESTION),
                );
            }
            None => {
                first_seen.insert(key, entry);
            }
        }
    }
    errors
}
