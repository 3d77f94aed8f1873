//! History command for the per-day statistics table.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{DailySummary, LogStore, Tracker};
use chrono::NaiveDateTime;

use super::util::format_minutes;

/// Prints one row per day, optionally limited to the last `days` days.
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    days: Option<u32>,
    exclude_anomalies: bool,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let rows = tracker
        .history_summary(days, exclude_anomalies, now)
        .context("failed to compute history")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&rows)?)?;
    } else {
        write!(writer, "{}", format_history(&rows))?;
    }
    Ok(())
}

/// Formats the history table.
#[allow(clippy::cast_possible_truncation)]
pub fn format_history(rows: &[DailySummary]) -> String {
    let mut output = String::new();

    if rows.is_empty() {
        writeln!(output, "No entries recorded.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<10}  {:>3}  {:>5}  {:>5}  {:>6}  {:>4}  {:>8}",
        "DATE", "WET", "DIRTY", "FEEDS", "ML", "NAPS", "NAP TIME"
    )
    .unwrap();

    for row in rows {
        let volume = if row.feeding_volume_ml.samples > 0 {
            format!("{:.0}", row.feeding_volume_ml.total)
        } else {
            "-".to_string()
        };
        let nap_time = if row.nap_minutes.samples > 0 {
            format_minutes(row.nap_minutes.total.round() as i64)
        } else {
            "-".to_string()
        };
        writeln!(
            output,
            "{:<10}  {:>3}  {:>5}  {:>5}  {:>6}  {:>4}  {:>8}",
            row.date.format("%Y-%m-%d").to_string(),
            row.wet_diapers,
            row.dirty_diapers,
            row.feedings,
            volume,
            row.naps,
            nap_time
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::MemoryLogStore;
    use insta::assert_snapshot;

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-11T09:00", "%Y-%m-%dT%H:%M").unwrap()
    }

    fn tracker() -> Tracker<MemoryLogStore> {
        let tracker = Tracker::with_default_retention(MemoryLogStore::new());
        tracker
            .overwrite_log(
                "2024-03-09T07:00,feeding,120 mL\n\
                 2024-03-09T08:00,wet diaper,no notes\n\
                 2024-03-09T13:00,asleep,no notes\n\
                 2024-03-09T13:20,feeding,no notes\n\
                 2024-03-09T14:30,awake,no notes\n\
                 2024-03-10T23:00,asleep,no notes\n\
                 2024-03-11T06:00,awake,no notes\n\
                 2024-03-11T06:30,poo diaper,no notes\n",
            )
            .unwrap();
        tracker
    }

    #[test]
    fn history_table() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), None, false, false, now()).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_snapshot!(output, @r"
        DATE        WET  DIRTY  FEEDS      ML  NAPS  NAP TIME
        2024-03-09    1      0      2     120     1    1h 30m
        2024-03-10    0      0      0       -     1         -
        2024-03-11    0      1      0       -     0         -
        ");
    }

    #[test]
    fn history_excluding_anomalies_drops_interrupted_nap() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), None, true, true, now()).unwrap();
        let rows: Vec<DailySummary> = serde_json::from_slice(&output).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].naps, 1);
        assert_eq!(rows[0].nap_minutes.samples, 0);
    }

    #[test]
    fn history_window() {
        let mut output = Vec::new();
        run(&mut output, &tracker(), Some(1), false, true, now()).unwrap();
        let rows: Vec<DailySummary> = serde_json::from_slice(&output).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dirty_diapers, 1);
    }
}
