//! Day command for one day's statistics.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{DailySummary, LogStore, Tracker};
use chrono::NaiveDateTime;

use super::util::{format_minutes, parse_date};

/// Prints the summary for `date` (default: today).
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    date: Option<&str>,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let date = date
        .map(|d| parse_date(d, now.date()))
        .transpose()?
        .unwrap_or_else(|| now.date());

    let summary = tracker
        .daily_stats(date, now)
        .context("failed to compute daily statistics")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        write!(writer, "{}", format_day(&summary))?;
    }
    Ok(())
}

/// Formats the human-readable day summary.
#[allow(clippy::cast_possible_truncation)]
pub fn format_day(summary: &DailySummary) -> String {
    let mut output = String::new();

    writeln!(output, "DAY: {}", summary.date.format("%A, %b %-d, %Y")).unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Diapers:  {} wet, {} dirty",
        summary.wet_diapers, summary.dirty_diapers
    )
    .unwrap();

    write!(output, "Feedings: {}", summary.feedings).unwrap();
    let volume = &summary.feeding_volume_ml;
    if let Some(mean) = volume.mean {
        write!(output, " ({:.0} mL total, mean {mean:.0} mL", volume.total).unwrap();
        if let Some(sd) = volume.stddev {
            write!(output, ", sd {sd:.0} mL").unwrap();
        }
        write!(output, ")").unwrap();
    }
    writeln!(output).unwrap();

    write!(output, "Naps:     {}", summary.naps).unwrap();
    let naps = &summary.nap_minutes;
    if let Some(mean) = naps.mean {
        write!(
            output,
            " ({} asleep, mean {})",
            format_minutes(naps.total.round() as i64),
            format_minutes(mean.round() as i64)
        )
        .unwrap();
    }
    writeln!(output).unwrap();

    if summary.long_sleeps > 0 {
        writeln!(output, "Long:     {} sleep(s) over 4h", summary.long_sleeps).unwrap();
    }

    let status = if summary.currently_asleep {
        "asleep".to_string()
    } else {
        summary.minutes_since_last_nap.map_or_else(
            || "no naps recorded".to_string(),
            |m| format!("awake for {}", format_minutes(m)),
        )
    };
    writeln!(output, "Now:      {status}").unwrap();

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::MemoryLogStore;
    use insta::assert_snapshot;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-10T14:00", "%Y-%m-%dT%H:%M").unwrap()
    }

    fn tracker() -> Tracker<MemoryLogStore> {
        let tracker = Tracker::with_default_retention(MemoryLogStore::new());
        tracker
            .overwrite_log(
                "2024-03-10T07:00,feeding,120 mL\n\
                 2024-03-10T07:30,mixed diaper,no notes\n\
                 2024-03-10T09:00,asleep,no notes\n\
                 2024-03-10T10:00,awake,no notes\n\
                 2024-03-10T10:15,feeding,fed solids\n\
                 2024-03-10T11:00,feeding,80 mL\n\
                 2024-03-10T12:00,asleep,no notes\n\
                 2024-03-10T12:30,awake,no notes\n",
            )
            .unwrap();
        tracker
    }

    #[test]
    fn day_summary_text() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), Some("2024-03-10"), false, now()).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_snapshot!(output, @r"
        DAY: Sunday, Mar 10, 2024

        Diapers:  1 wet, 1 dirty
        Feedings: 3 (200 mL total, mean 100 mL, sd 28 mL)
        Naps:     2 (1h 30m asleep, mean 45m)
        Now:      awake for 1h 30m
        ");
    }

    #[test]
    fn empty_day_text() {
        let tracker = Tracker::with_default_retention(MemoryLogStore::new());
        let mut output = Vec::new();
        run(&mut output, &tracker, None, false, now()).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_snapshot!(output, @r"
        DAY: Sunday, Mar 10, 2024

        Diapers:  0 wet, 0 dirty
        Feedings: 0
        Naps:     0
        Now:      no naps recorded
        ");
    }

    #[test]
    fn day_summary_json() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), None, true, now()).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(parsed["date"], "2024-03-10");
        assert_eq!(parsed["feedings"], 3);
        assert_eq!(parsed["feeding_volume_ml"]["samples"], 2);
        assert_eq!(parsed["currently_asleep"], false);
        assert_eq!(parsed["minutes_since_last_nap"], 90);
    }
}
