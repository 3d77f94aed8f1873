//! Log command for printing recorded entries.

use std::io::Write;

use anyhow::{Context, Result};
use bt_core::{LogStore, Tracker};

/// Prints the active log, or the full history with `all`.
pub fn run<S: LogStore, W: Write>(
    writer: &mut W,
    tracker: &Tracker<S>,
    reverse: bool,
    all: bool,
    json: bool,
) -> Result<()> {
    let events = if all {
        let mut events = tracker.full_log().context("failed to read log")?;
        if reverse {
            events.reverse();
        }
        events
    } else {
        tracker.query_log(reverse).context("failed to read log")?
    };

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&events)?)?;
        return Ok(());
    }

    if events.is_empty() {
        writeln!(writer, "No entries recorded.")?;
        return Ok(());
    }

    for event in &events {
        writeln!(writer, "{}", event.to_line())?;
    }

    Ok(())
}
