//! Histogram command for sleep likelihood by time of day.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{HistogramTable, LogStore, Tracker};
use chrono::NaiveDateTime;

use super::util::ratio_bar;

/// Prints the time-of-day sleep histogram.
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    days: Option<u32>,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let table = tracker
        .sleep_histogram(days, now)
        .context("failed to compute sleep histogram")?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&table)?)?;
    } else {
        write!(writer, "{}", format_histogram(&table))?;
    }
    Ok(())
}

/// Formats buckets with at least one nap, one per line.
#[allow(clippy::cast_possible_truncation)]
pub fn format_histogram(table: &HistogramTable) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "ASLEEP BY TIME OF DAY ({} day(s) observed)",
        table.observed_days
    )
    .unwrap();
    writeln!(output).unwrap();

    let mut any = false;
    for bucket in table.buckets.iter().filter(|b| b.count > 0) {
        any = true;
        writeln!(
            output,
            "{}  {}  {:>3}%  ({})",
            bucket.time,
            ratio_bar(bucket.fraction),
            (bucket.fraction * 100.0).round() as i64,
            bucket.count
        )
        .unwrap();
    }

    if !any {
        writeln!(output, "No completed naps recorded.").unwrap();
    }

    output
}
