//! Edit command for replacing the active log by hand.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use bt_core::{Event, LogStore, Tracker};

/// Replaces the active log with everything read from `reader`.
///
/// Unparseable lines are kept as written and reported; reads skip them.
pub fn run<S: LogStore, R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    tracker: &Tracker<S>,
) -> Result<()> {
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .context("failed to read replacement log from stdin")?;

    let mut entries = 0;
    let mut unparseable = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match Event::parse_line(line) {
            Ok(_) => entries += 1,
            Err(e) => unparseable.push(format!("line {}: {e}", i + 1)),
        }
    }

    tracker
        .overwrite_log(&contents)
        .context("failed to overwrite log")?;

    writeln!(writer, "Active log replaced: {entries} entries.")?;
    if !unparseable.is_empty() {
        writeln!(
            writer,
            "Warning: {} line(s) will be ignored until fixed:",
            unparseable.len()
        )?;
        for problem in &unparseable {
            writeln!(writer, "  {problem}")?;
        }
    }

    Ok(())
}
