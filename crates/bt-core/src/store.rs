//! Log storage abstraction.
//!
//! The history lives in two line-oriented resources: the bounded *active log*
//! and the unbounded *archive*. Reading the archive followed by the active log
//! always yields the full history in file order.
//!
//! # Rotation
//!
//! Rotation appends the evicted lines to the archive before truncating the
//! active log. An interruption between the two steps leaves a duplicate in the
//! archive, never a lost event.

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

use crate::event::Event;

/// Default number of events kept in the active log.
pub const DEFAULT_RETAIN_COUNT: usize = 100;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing a log file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The store lock could not be acquired.
    #[error("failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persistence for the event log.
///
/// Implementations serialize their own operations; callers may share a store
/// by reference.
pub trait LogStore {
    /// Appends one event to the active log.
    fn append(&self, event: &Event) -> Result<(), StoreError>;

    /// Reads events in file order, archive first when `include_archive` is set.
    ///
    /// Malformed lines are skipped and logged. Missing files read as empty.
    fn read(&self, include_archive: bool) -> Result<Vec<Event>, StoreError>;

    /// Returns the active log verbatim.
    fn read_raw(&self) -> Result<String, StoreError>;

    /// Moves all but the newest `retain_count` active lines to the archive.
    ///
    /// Returns the number of lines moved.
    fn rotate(&self, retain_count: usize) -> Result<usize, StoreError>;

    /// Replaces the active log with `contents`, bypassing rotation.
    fn overwrite(&self, contents: &str) -> Result<(), StoreError>;
}

/// Parses log text, skipping and logging lines that do not parse.
pub fn parse_log(text: &str, source: &str) -> Vec<Event> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(i, line)| match Event::parse_line(line) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(source, line = i + 1, error = %e, "skipping malformed log line");
                None
            }
        })
        .collect()
}

/// Splits active log text into lines to evict and lines to keep.
///
/// Returns `None` when the log is within `retain_count` lines. Blank lines are
/// dropped; malformed lines move like any other.
pub fn split_for_rotation(text: &str, retain_count: usize) -> Option<(Vec<&str>, Vec<&str>)> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.len() <= retain_count {
        return None;
    }
    let split = lines.len() - retain_count;
    Some((lines[..split].to_vec(), lines[split..].to_vec()))
}

/// Joins lines with a trailing newline after each.
pub fn join_lines(lines: &[&str]) -> String {
    lines.iter().fold(String::new(), |mut out, line| {
        out.push_str(line);
        out.push('\n');
        out
    })
}

/// Appends `text` to `buffer`, first terminating an unterminated last line.
fn append_text(buffer: &mut String, text: &str) {
    if !buffer.is_empty() && !buffer.ends_with('\n') {
        buffer.push('\n');
    }
    buffer.push_str(text);
}

#[derive(Debug, Default)]
struct MemoryState {
    active: String,
    archive: String,
}

/// In-memory store for tests and ephemeral use.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    state: Mutex<MemoryState>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the archive verbatim.
    pub fn archive_text(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .archive
            .clone()
    }
}

impl LogStore for MemoryLogStore {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        append_text(&mut state.active, &format!("{}\n", event.to_line()));
        Ok(())
    }

    fn read(&self, include_archive: bool) -> Result<Vec<Event>, StoreError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events = Vec::new();
        if include_archive {
            events.extend(parse_log(&state.archive, "archive"));
        }
        events.extend(parse_log(&state.active, "active"));
        Ok(events)
    }

    fn read_raw(&self) -> Result<String, StoreError> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(state.active.clone())
    }

    fn rotate(&self, retain_count: usize) -> Result<usize, StoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((evicted, kept)) = split_for_rotation(&state.active, retain_count) else {
            return Ok(0);
        };
        let moved = evicted.len();
        let evicted = join_lines(&evicted);
        let kept = join_lines(&kept);

        append_text(&mut state.archive, &evicted);
        state.active = kept;
        Ok(moved)
    }

    fn overwrite(&self, contents: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.active = contents.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDateTime};

    use crate::event::TIMESTAMP_FORMAT;

    fn nth_event(n: i64) -> Event {
        let base = NaiveDateTime::parse_from_str("2024-01-01T06:00", TIMESTAMP_FORMAT).unwrap();
        Event::new(base + Duration::minutes(n * 30), "feeding", format!("{n} mL")).unwrap()
    }

    #[test]
    fn read_of_empty_store_is_empty() {
        let store = MemoryLogStore::new();
        assert!(store.read(true).unwrap().is_empty());
        assert_eq!(store.read_raw().unwrap(), "");
    }

    #[test]
    fn rotation_preserves_full_history() {
        let store = MemoryLogStore::new();
        let events: Vec<Event> = (0..12).map(nth_event).collect();

        for event in &events[..7] {
            store.append(event).unwrap();
        }
        assert_eq!(store.rotate(4).unwrap(), 3);
        for event in &events[7..] {
            store.append(event).unwrap();
        }

        assert_eq!(store.read(true).unwrap(), events);
        assert_eq!(store.read(false).unwrap(), events[3..]);
        assert_eq!(store.archive_text().lines().count(), 3);
    }

    #[test]
    fn rotation_within_limit_is_noop() {
        let store = MemoryLogStore::new();
        store.append(&nth_event(0)).unwrap();
        assert_eq!(store.rotate(4).unwrap(), 0);
        assert_eq!(store.archive_text(), "");
    }

    #[test]
    fn malformed_lines_are_skipped_but_rotated() {
        let store = MemoryLogStore::new();
        store
            .overwrite("garbage line\n2024-01-01T06:00,feeding,no notes\n")
            .unwrap();

        assert_eq!(store.read(true).unwrap().len(), 1);
        assert_eq!(store.rotate(1).unwrap(), 1);
        assert_eq!(store.archive_text(), "garbage line\n");
    }

    #[test]
    fn append_after_unterminated_overwrite_starts_new_line() {
        let store = MemoryLogStore::new();
        store.overwrite("2024-01-01T06:00,feeding,no notes").unwrap();
        store.append(&nth_event(1)).unwrap();
        assert_eq!(store.read(false).unwrap().len(), 2);
    }

    #[test]
    fn split_for_rotation_ignores_blank_lines() {
        let (evicted, kept) = split_for_rotation("a\n\nb\nc\n", 2).unwrap();
        assert_eq!(evicted, vec!["a"]);
        assert_eq!(kept, vec!["b", "c"]);
        assert!(split_for_rotation("a\n\n", 1).is_none());
    }
}
