//! Video excerpts bounded by timestamps.

use crate::models::TimestampEntry;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VideoExcerptError {
    #[error("Invalid start time '{value}'; expected M:SS or H:MM:SS")]
    InvalidFrom { value: String },

    #[error("Invalid end time '{value}'; expected M:SS or H:MM:SS")]
    InvalidTo { value: String },

    #[error("Start time {from} is not before end time {to}")]
    EmptyRange { from: String, to: String },

    #[error("No timestamps file for {source_path}; time ranges cannot be resolved")]
    MissingTimestamps { source_path: String },

    #[error("No transcript entries between {from} and {to} in {source_path}")]
    NoEntries {
        from: String,
        to: String,
        source_path: String,
    },
}

/// A time slice of a transcript
#[derive(Debug, Clone, PartialEq)]
pub struct VideoExcerpt {
    pub from: f64,
    pub to: Option<f64>,
    pub transcript: String,
}

/// Parse `M:SS`, `MM:SS` or `H:MM:SS` (seconds may carry a fraction) into
/// seconds. Anything else is `None`.
///
/// ```
/// use coursemark_core::excerpt::parse_timestamp;
///
/// assert_eq!(parse_timestamp("1:05"), Some(65.0));
/// assert_eq!(parse_timestamp("1:00:30.5"), Some(3630.5));
/// assert_eq!(parse_timestamp("ninety"), None);
/// ```
pub fn parse_timestamp(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return None,
    };
    let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || !all_digits(minutes) {
        return None;
    }
    if parts.len() == 3 && minutes.len() != 2 {
        return None;
    }

    let (whole, fraction) = match seconds.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (seconds, None),
    };
    if whole.len() != 2 || !all_digits(whole) || fraction.is_some_and(|f| !all_digits(f)) {
        return None;
    }

    let hours: f64 = hours.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    if seconds >= 60.0 || (parts.len() == 3 && minutes >= 60.0) {
        return None;
    }
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Render seconds as `M:SS` (or `H:MM:SS` past an hour)
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// Cut the transcript text between `from` and `to`
///
/// Entries whose start lies in `[from, to)` are joined with single spaces. A
/// missing `from` starts at zero and a missing `to` runs to the end. With no
/// range at all the whole transcript body is used; any range needs timestamp
/// entries.
pub fn extract_video_excerpt(
    transcript: &str,
    from: Option<&str>,
    to: Option<&str>,
    source_path: &str,
    entries: Option<&[TimestampEntry]>,
) -> Result<VideoExcerpt, VideoExcerptError> {
    let from_secs = match from {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| VideoExcerptError::InvalidFrom {
            value: raw.to_string(),
        })?,
        None => 0.0,
    };
    let to_secs = match to {
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| VideoExcerptError::InvalidTo {
            value: raw.to_string(),
        })?),
        None => None,
    };
    if let Some(end) = to_secs {
        if from_secs >= end {
            return Err(VideoExcerptError::EmptyRange {
                from: format_timestamp(from_secs),
                to: format_timestamp(end),
            });
        }
    }

    if from.is_none() && to.is_none() {
        return Ok(VideoExcerpt {
            from: 0.0,
            to: None,
            transcript: transcript.trim().to_string(),
        });
    }

    let entries = entries.ok_or_else(|| VideoExcerptError::MissingTimestamps {
        source_path: source_path.to_string(),
    })?;
    let text = entries
        .iter()
        .filter(|e| e.start >= from_secs && to_secs.map_or(true, |end| e.start < end))
        .map(|e| e.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if text.is_empty() {
        return Err(VideoExcerptError::NoEntries {
            from: format_timestamp(from_secs),
            to: to_secs.map_or_else(|| "the end".to_string(), format_timestamp),
            source_path: source_path.to_string(),
        });
    }

    Ok(VideoExcerpt {
        from: from_secs,
        to: to_secs,
        transcript: text,
    })
}
