//! Naps command for listing reconciled naps and unpaired markers.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{AnomalyKind, LogStore, NapSnapshot, SleepAnomaly, Tracker};
use chrono::NaiveDateTime;
use serde_json::json;

use super::util::{format_minutes, parse_date};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Prints naps (optionally for one start date) followed by unpaired markers.
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    date: Option<&str>,
    json: bool,
    now: NaiveDateTime,
) -> Result<()> {
    let date = date.map(|d| parse_date(d, now.date())).transpose()?;

    let naps = tracker.naps(date, now).context("failed to reconcile naps")?;
    let anomalies: Vec<SleepAnomaly> = tracker
        .anomalies()
        .context("failed to detect anomalies")?
        .into_iter()
        .filter(|a| date.is_none_or(|d| a.timestamp.date() == d))
        .collect();

    if json {
        let value = json!({ "naps": naps, "anomalies": anomalies });
        writeln!(writer, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        write!(writer, "{}", format_naps(&naps, &anomalies))?;
    }
    Ok(())
}

const fn describe(kind: AnomalyKind) -> &'static str {
    match kind {
        AnomalyKind::AsleepWithoutWake => "asleep not followed by awake",
        AnomalyKind::AwakeWithoutSleep => "awake not preceded by asleep",
        AnomalyKind::SupersededAsleep => "asleep replaced by a later asleep",
    }
}

/// Formats naps and unpaired markers.
pub fn format_naps(naps: &[NapSnapshot], anomalies: &[SleepAnomaly]) -> String {
    let mut output = String::new();

    if naps.is_empty() {
        writeln!(output, "No naps recorded.").unwrap();
    }

    for nap in naps {
        let end = nap
            .end
            .map_or_else(|| "now".to_string(), |e| e.format(TIME_FORMAT).to_string());

        let mut tags = Vec::new();
        if nap.still_asleep {
            tags.push("asleep");
        }
        if nap.overnight {
            tags.push("overnight");
        }
        if nap.long_sleep {
            tags.push("long");
        }

        write!(
            output,
            "{} -> {:<16}  {:>7}",
            nap.start.format(TIME_FORMAT),
            end,
            format_minutes(nap.duration_minutes)
        )
        .unwrap();
        if !tags.is_empty() {
            write!(output, "  [{}]", tags.join(", ")).unwrap();
        }
        writeln!(output).unwrap();
    }

    if !anomalies.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "UNPAIRED MARKERS").unwrap();
        for anomaly in anomalies {
            writeln!(
                output,
                "{}  {}",
                anomaly.timestamp.format(TIME_FORMAT),
                describe(anomaly.kind)
            )
            .unwrap();
        }
    }

    output
}
