//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use regex::Regex;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s+(minute|hour|day|week)s?\s+ago$").unwrap());

/// Conservative bounds for relative time parsing (~100 years in minutes).
const MAX_RELATIVE_MINUTES: i64 = 100 * 365 * 24 * 60;

/// Parse a local time as either a log timestamp or a relative time.
///
/// Supports:
/// - Log format: "2026-01-15T10:30" (seconds accepted and dropped)
/// - "now"
/// - Relative: "20 minutes ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str, now: NaiveDateTime) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("now") {
        return Ok(now);
    }

    if let Ok(dt) = bt_core::event::parse_timestamp(s) {
        return Ok(dt);
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s) else {
        anyhow::bail!(
            "Invalid time: {s}. Use YYYY-MM-DDTHH:MM (e.g., 2026-01-15T10:30), 'now', or relative (e.g., '20 minutes ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let (max_for_unit, minutes_per_unit) = match &caps[2] {
        "minute" => (MAX_RELATIVE_MINUTES, 1),
        "hour" => (MAX_RELATIVE_MINUTES / 60, 60),
        "day" => (MAX_RELATIVE_MINUTES / (60 * 24), 60 * 24),
        "week" => (MAX_RELATIVE_MINUTES / (60 * 24 * 7), 60 * 24 * 7),
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > max_for_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::minutes(n * minutes_per_unit))
}

/// Parse a calendar day: "YYYY-MM-DD", "today" or "yesterday".
pub fn parse_date(s: &str, today: NaiveDate) -> anyhow::Result<NaiveDate> {
    match s.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .with_context(|| format!("Invalid date: {other}. Use YYYY-MM-DD")),
    }
}

/// Formats whole minutes as "Xh Ym" if >= 1 hour, "Xm" otherwise.
/// Negative values are shown as 0m.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    let hours = minutes / 60;
    let rest = minutes % 60;

    if hours >= 1 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// Generates a 10-character bar for a ratio in [0, 1].
/// Non-zero ratios under 5% get a single block for visibility.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn ratio_bar(ratio: f64) -> String {
    let ratio = ratio.clamp(0.0, 1.0);
    let filled = if ratio > 0.0 && ratio < 0.05 {
        1
    } else {
        (ratio * 10.0).round() as usize
    };
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-01-15T10:30", "%Y-%m-%dT%H:%M").unwrap()
    }

    #[test]
    fn parse_datetime_accepts_log_format() {
        let dt = parse_datetime("2026-01-14T08:05", now()).unwrap();
        assert_eq!(dt.to_string(), "2026-01-14 08:05:00");
    }

    #[test]
    fn parse_datetime_relative() {
        assert_eq!(parse_datetime("now", now()).unwrap(), now());
        assert_eq!(
            parse_datetime("20 minutes ago", now()).unwrap(),
            now() - Duration::minutes(20)
        );
        assert_eq!(
            parse_datetime("1 day ago", now()).unwrap(),
            now() - Duration::days(1)
        );
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        let err = parse_datetime("soon", now()).unwrap_err();
        assert!(err.to_string().contains("Invalid time"));
        assert!(parse_datetime("99999999 weeks ago", now()).is_err());
    }

    #[test]
    fn parse_date_keywords() {
        let today = now().date();
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(
            parse_date("Yesterday", today).unwrap(),
            today - Duration::days(1)
        );
        assert_eq!(
            parse_date("2026-01-01", today).unwrap().to_string(),
            "2026-01-01"
        );
        assert!(parse_date("01/01/2026", today).is_err());
    }

    #[test]
    fn format_minutes_variants() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(105), "1h 45m");
        assert_eq!(format_minutes(-5), "0m");
    }

    #[test]
    fn ratio_bar_variants() {
        assert_eq!(ratio_bar(0.0), "░░░░░░░░░░");
        assert_eq!(ratio_bar(0.01), "█░░░░░░░░░");
        assert_eq!(ratio_bar(0.5), "█████░░░░░");
        assert_eq!(ratio_bar(1.5), "██████████");
    }
}
