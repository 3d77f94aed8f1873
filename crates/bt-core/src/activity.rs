//! Activity enum as the single source of truth for activity strings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical activities a caregiver logs.
///
/// Anything outside the fixed vocabulary is kept verbatim as [`Activity::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Activity {
    Feeding,
    WetDiaper,
    PooDiaper,
    MixedDiaper,
    Asleep,
    Awake,
    Other(String),
}

impl Activity {
    /// Parses an activity field, matching the fixed vocabulary case-insensitively.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "feeding" => Self::Feeding,
            "wet diaper" => Self::WetDiaper,
            "poo diaper" => Self::PooDiaper,
            "mixed diaper" => Self::MixedDiaper,
            "asleep" => Self::Asleep,
            "awake" => Self::Awake,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    /// Returns the string written to the log.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Feeding => "feeding",
            Self::WetDiaper => "wet diaper",
            Self::PooDiaper => "poo diaper",
            Self::MixedDiaper => "mixed diaper",
            Self::Asleep => "asleep",
            Self::Awake => "awake",
            Self::Other(s) => s.as_str(),
        }
    }

    /// True for diapers that count as wet (`wet diaper`, `mixed diaper`).
    pub const fn is_wet(&self) -> bool {
        matches!(self, Self::WetDiaper | Self::MixedDiaper)
    }

    /// True for diapers that count as dirty (`poo diaper`, `mixed diaper`).
    pub const fn is_dirty(&self) -> bool {
        matches!(self, Self::PooDiaper | Self::MixedDiaper)
    }

    /// True for `asleep` and `awake`.
    pub const fn is_sleep_marker(&self) -> bool {
        matches!(self, Self::Asleep | Self::Awake)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Activity {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Activity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Activity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::parse(&s))
    }
}
