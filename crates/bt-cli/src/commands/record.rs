//! Record command for appending an activity to the log.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{Event, LogStore, Tracker};
use chrono::NaiveDateTime;

use super::util::parse_datetime;

/// Records one activity and rotates the active log.
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    activity: &str,
    notes: &str,
    time: &str,
    now: NaiveDateTime,
) -> Result<()> {
    let timestamp = parse_datetime(time, now)?;
    let event = Event::new(timestamp, activity, notes).context("invalid event")?;

    tracker.record(&event).context("failed to record event")?;
    writeln!(writer, "Recorded: {}", event.to_line())?;

    Ok(())
}
