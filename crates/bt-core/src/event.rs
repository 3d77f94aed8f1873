//! Logged events and the three-field line format.
//!
//! Each line of the log is `timestamp,activity,notes`. The split is capped at
//! two commas, so notes may themselves contain commas.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::Activity;

/// Format used when writing timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Second-precision variant accepted on read.
const TIMESTAMP_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Placeholder written when an event carries no notes.
pub const NO_NOTES: &str = "no notes";

/// Volume in millilitres: a number followed (loosely) by an `mL` token.
static VOLUME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*ml\b").unwrap());

/// Errors raised while parsing a log line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not have the three-field shape.
    #[error("malformed log line ({reason}): {line:?}")]
    MalformedLine { line: String, reason: &'static str },

    /// The timestamp field matched neither accepted format.
    #[error("invalid timestamp {value:?}, expected YYYY-MM-DDTHH:MM")]
    InvalidTimestamp { value: String },
}

/// Errors raised when building an event that could not be written back as one line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("activity cannot be empty")]
    EmptyActivity,

    #[error("activity cannot contain commas or line breaks: {0:?}")]
    InvalidActivity(String),

    #[error("notes cannot contain line breaks")]
    InvalidNotes,
}

/// A single logged activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Local wall-clock time, minute precision.
    pub timestamp: NaiveDateTime,
    pub activity: Activity,
    /// Free text. Never empty; see [`NO_NOTES`].
    pub notes: String,
}

impl Event {
    /// Builds an event, validating that it serializes to a single parseable line.
    ///
    /// Seconds are dropped from the timestamp and empty notes become [`NO_NOTES`].
    pub fn new(
        timestamp: NaiveDateTime,
        activity: impl Into<Activity>,
        notes: impl Into<String>,
    ) -> Result<Self, EventError> {
        let activity = activity.into();
        let text = activity.as_str();
        if text.is_empty() {
            return Err(EventError::EmptyActivity);
        }
        if text.contains([',', '\n', '\r']) {
            return Err(EventError::InvalidActivity(text.to_string()));
        }

        let notes = notes.into();
        if notes.contains(['\n', '\r']) {
            return Err(EventError::InvalidNotes);
        }

        Ok(Self {
            timestamp: truncate_to_minute(timestamp),
            activity,
            notes: normalize_notes(notes),
        })
    }

    /// Parses one raw log line.
    pub fn parse_line(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let mut parts = line.splitn(3, ',');

        let (Some(timestamp), Some(activity), Some(notes)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::MalformedLine {
                line: line.to_string(),
                reason: "expected three comma-separated fields",
            });
        };

        let activity = Activity::parse(activity);
        if activity.as_str().is_empty() {
            return Err(ParseError::MalformedLine {
                line: line.to_string(),
                reason: "activity is empty",
            });
        }

        Ok(Self {
            timestamp: parse_timestamp(timestamp)?,
            activity,
            notes: normalize_notes(notes.to_string()),
        })
    }

    /// Serializes to the log line format, without a trailing newline.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.activity,
            self.notes
        )
    }

    /// Calendar date of the event.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Volume recorded in the notes, if any.
    pub fn volume_ml(&self) -> Option<f64> {
        extract_volume_ml(&self.notes)
    }
}

/// Parses a log timestamp, accepting minute or second precision.
///
/// Minutes are canonical: seconds are accepted and dropped.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    match NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT_SECONDS) {
        Ok(ts) => {
            if ts.second() != 0 {
                tracing::debug!(value, "truncating timestamp to minute precision");
            }
            Ok(truncate_to_minute(ts))
        }
        Err(_) => Err(ParseError::InvalidTimestamp {
            value: value.to_string(),
        }),
    }
}

/// Extracts a volume in millilitres from free-text notes.
///
/// Returns `None` when no volume is present; an unknown amount is not zero.
pub fn extract_volume_ml(notes: &str) -> Option<f64> {
    VOLUME_RE
        .captures(notes)
        .and_then(|caps| caps[1].parse().ok())
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|ts| ts.with_nanosecond(0))
        .unwrap_or(ts)
}

fn normalize_notes(notes: String) -> String {
    if notes.trim().is_empty() {
        NO_NOTES.to_string()
    } else {
        notes
    }
}
