//! Timestamp sidecars (`video_transcripts/**/*.timestamps.json`).
//!
//! A sidecar is a JSON array of `{"text": "...", "start": "M:SS"}` entries.
//! Bad entries are reported by index and dropped; the rest are kept.

use crate::excerpt::video::{format_timestamp, parse_timestamp};
use crate::models::{ParseOutcome, TimestampEntry, TimestampSidecar};
use coursemark_types::ContentError;
use serde_json::Value;

pub fn parse_timestamps(content: &str, path: &str) -> ParseOutcome<TimestampSidecar> {
    let mut errors = Vec::new();

    let root: Value = match serde_json::from_str(content) {
        Ok(value) => value,
        Err(e) => {
            errors.push(
                ContentError::error(path, format!("Invalid JSON in timestamps file: {}", e))
                    .at_line(e.line().max(1)),
            );
            return ParseOutcome::failed(errors);
        }
    };
    let Value::Array(items) = root else {
        errors.push(
            ContentError::error(path, "Timestamps file must be a JSON array of entries")
                .at_line(1)
                .with_suggestion(r#"[{"text": "...", "start": "0:00"}]"#),
        );
        return ParseOutcome::failed(errors);
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if let Some(entry) = parse_entry(index, item, path, &mut errors) {
            entries.push(entry);
        }
    }

    ParseOutcome::new(
        Some(TimestampSidecar {
            path: path.to_string(),
            entries,
        }),
        errors,
    )
}

fn parse_entry(
    index: usize,
    item: &Value,
    path: &str,
    errors: &mut Vec<ContentError>,
) -> Option<TimestampEntry> {
    let Value::Object(fields) = item else {
        errors.push(ContentError::error(
            path,
            format!("Entry {}: expected an object with 'text' and 'start'", index),
        ));
        return None;
    };

    let text = match fields.get("text") {
        Some(Value::String(text)) => text.clone(),
        _ => {
            errors.push(ContentError::error(
                path,
                format!("Entry {}: 'text' must be a string", index),
            ));
            return None;
        }
    };

    let start = match fields.get("start") {
        Some(Value::String(raw)) => match parse_timestamp(raw) {
            Some(seconds) => seconds,
            None => {
                errors.push(
                    ContentError::error(
                        path,
                        format!(
                            "Entry {}: 'start' value '{}' is not a valid timestamp",
                            index, raw
                        ),
                    )
                    .with_suggestion("Use \"M:SS\" or \"H:MM:SS\""),
                );
                return None;
            }
        },
        Some(Value::Number(n)) => {
            let mut error = ContentError::error(
                path,
                format!(
                    "Entry {}: 'start' must be a string like \"M:SS\", found number {}",
                    index, n
                ),
            );
            if let Some(seconds) = n.as_f64().filter(|s| s.is_finite() && *s >= 0.0) {
                let suggestion = format!("\"start\": \"{}\"", format_timestamp(seconds));
                error = error.with_suggestion(suggestion);
            }
            errors.push(error);
            return None;
        }
        _ => {
            errors.push(ContentError::error(
                path,
                format!("Entry {}: missing 'start' timestamp", index),
            ));
            return None;
        }
    };

    Some(TimestampEntry { text, start })
}
