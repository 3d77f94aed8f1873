//! Flat-file storage for the baby tracker.
//!
//! Provides [`FileLogStore`], a [`LogStore`] backed by two text files: the
//! active log and the archive. Each line is `timestamp,activity,notes`.
//!
//! # Locking
//!
//! Every operation holds an exclusive advisory lock (`fs2`) on a sibling
//! `.lock` file, so concurrent processes cannot interleave an append with a
//! rotation. The lock is released when the operation returns.
//!
//! # Crash Safety
//!
//! Rotation appends evicted lines to the archive and syncs it before the
//! active log is replaced. The replacement is written to a temporary file and
//! renamed over the active log, so the active log is never half-written. A
//! crash between the two steps duplicates lines in the archive rather than
//! losing them.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bt_core::store::{join_lines, parse_log, split_for_rotation};
use bt_core::{Event, LogStore, StoreError};
use fs2::FileExt;

/// File name of the active log inside a data directory.
pub const ACTIVE_FILE: &str = "log.txt";

/// File name of the archive inside a data directory.
pub const ARCHIVE_FILE: &str = "archive.txt";

/// Line counts of both files, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    pub active: usize,
    pub archive: usize,
}

/// Active log and archive on disk.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    active_path: PathBuf,
    archive_path: PathBuf,
    lock_path: PathBuf,
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl FileLogStore {
    /// Opens a store, creating parent directories and empty files as needed.
    pub fn open(
        active_path: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
    ) -> Result<Self, StoreError> {
        let active_path = active_path.into();
        let archive_path = archive_path.into();
        let lock_path = active_path.with_extension("lock");
        let store = Self {
            active_path,
            archive_path,
            lock_path,
        };
        store.init()?;
        Ok(store)
    }

    /// Opens a store using the default file names inside `dir`.
    pub fn open_in_dir(dir: &Path) -> Result<Self, StoreError> {
        Self::open(dir.join(ACTIVE_FILE), dir.join(ARCHIVE_FILE))
    }

    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Creates both files if absent. Idempotent.
    fn init(&self) -> Result<(), StoreError> {
        for path in [&self.active_path, &self.archive_path, &self.lock_path] {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(io_error(parent))?;
                }
            }
        }
        for path in [&self.active_path, &self.archive_path] {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(io_error(path))?;
        }
        Ok(())
    }

    /// Acquires the store lock. Dropping the returned file releases it.
    fn lock(&self) -> Result<File, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_path)
            .map_err(io_error(&self.lock_path))?;
        file.lock_exclusive().map_err(|source| StoreError::Lock {
            path: self.lock_path.clone(),
            source,
        })?;
        Ok(file)
    }

    /// Counts non-blank lines in both files.
    pub fn line_counts(&self) -> Result<LineCounts, StoreError> {
        let _lock = self.lock()?;
        let count = |text: String| text.lines().filter(|l| !l.trim().is_empty()).count();
        Ok(LineCounts {
            active: count(read_file(&self.active_path)?),
            archive: count(read_file(&self.archive_path)?),
        })
    }
}

/// Reads a file, treating a missing file as empty.
fn read_file(path: &Path) -> Result<String, StoreError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(io_error(path)(e)),
    }
}

/// Appends `text` and syncs, first terminating an unterminated last line.
fn append_file(path: &Path, text: &str) -> Result<(), StoreError> {
    let mut file = OpenOptions::new()
        .create(true)
        .read(true)
        .append(true)
        .open(path)
        .map_err(io_error(path))?;

    let needs_newline = if file.metadata().map_err(io_error(path))?.len() > 0 {
        let mut last = [0_u8; 1];
        file.seek(SeekFrom::End(-1)).map_err(io_error(path))?;
        file.read_exact(&mut last).map_err(io_error(path))?;
        last[0] != b'\n'
    } else {
        false
    };

    if needs_newline {
        file.write_all(b"\n").map_err(io_error(path))?;
    }
    file.write_all(text.as_bytes()).map_err(io_error(path))?;
    file.sync_all().map_err(io_error(path))
}

/// Replaces a file's contents through a temporary sibling and a rename.
fn replace_file(path: &Path, text: &str) -> Result<(), StoreError> {
    let mut tmp_name: OsString = path
        .file_name()
        .map_or_else(|| OsString::from("log"), OsString::from);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let mut file = File::create(&tmp_path).map_err(io_error(&tmp_path))?;
    file.write_all(text.as_bytes()).map_err(io_error(&tmp_path))?;
    file.sync_all().map_err(io_error(&tmp_path))?;
    fs::rename(&tmp_path, path).map_err(io_error(path))
}

impl LogStore for FileLogStore {
    fn append(&self, event: &Event) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        append_file(&self.active_path, &format!("{}\n", event.to_line()))
    }

    fn read(&self, include_archive: bool) -> Result<Vec<Event>, StoreError> {
        let _lock = self.lock()?;
        let mut events = Vec::new();
        if include_archive {
            events.extend(parse_log(&read_file(&self.archive_path)?, "archive"));
        }
        events.extend(parse_log(&read_file(&self.active_path)?, "active"));
        Ok(events)
    }

    fn read_raw(&self) -> Result<String, StoreError> {
        let _lock = self.lock()?;
        read_file(&self.active_path)
    }

    fn rotate(&self, retain_count: usize) -> Result<usize, StoreError> {
        let _lock = self.lock()?;
        let active = read_file(&self.active_path)?;
        let Some((evicted, kept)) = split_for_rotation(&active, retain_count) else {
            return Ok(0);
        };

        append_file(&self.archive_path, &join_lines(&evicted))?;
        replace_file(&self.active_path, &join_lines(&kept))?;

        tracing::debug!(
            moved = evicted.len(),
            archive = %self.archive_path.display(),
            "rotated active log"
        );
        Ok(evicted.len())
    }

    fn overwrite(&self, contents: &str) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        replace_file(&self.active_path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_core::Activity;
    use chrono::{Duration, NaiveDateTime};

    fn nth_event(n: i64) -> Event {
        let base = NaiveDateTime::parse_from_str("2024-01-01T06:00", "%Y-%m-%dT%H:%M").unwrap();
        Event::new(base + Duration::minutes(n * 45), "feeding", format!("{n}0 mL")).unwrap()
    }

    #[test]
    fn open_creates_empty_files() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("nested/bt");
        let store = FileLogStore::open_in_dir(&dir).unwrap();

        assert!(store.active_path().exists());
        assert!(store.archive_path().exists());
        assert!(store.read(true).unwrap().is_empty());
    }

    #[test]
    fn missing_active_log_reads_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        fs::remove_file(store.active_path()).unwrap();

        assert!(store.read(false).unwrap().is_empty());
        assert_eq!(store.read_raw().unwrap(), "");
    }

    #[test]
    fn append_writes_three_field_lines() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        let event = Event::new(
            NaiveDateTime::parse_from_str("2024-01-01T06:00", "%Y-%m-%dT%H:%M").unwrap(),
            Activity::Feeding,
            "",
        )
        .unwrap();
        store.append(&event).unwrap();

        let raw = fs::read_to_string(store.active_path()).unwrap();
        assert_eq!(raw, "2024-01-01T06:00,feeding,no notes\n");
    }

    #[test]
    fn rotation_partitions_history() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        let events: Vec<Event> = (0..10).map(nth_event).collect();

        for event in &events[..6] {
            store.append(event).unwrap();
        }
        assert_eq!(store.rotate(4).unwrap(), 2);
        for event in &events[6..] {
            store.append(event).unwrap();
        }
        assert_eq!(store.rotate(4).unwrap(), 4);

        assert_eq!(store.read(true).unwrap(), events);
        assert_eq!(store.read(false).unwrap(), events[6..]);
        assert_eq!(
            store.line_counts().unwrap(),
            LineCounts {
                active: 4,
                archive: 6
            }
        );
        assert!(!temp.path().join("log.txt.tmp").exists());
    }

    #[test]
    fn interrupted_rotation_duplicates_rather_than_loses() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        let events: Vec<Event> = (0..3).map(nth_event).collect();
        for event in &events {
            store.append(event).unwrap();
        }

        // archive append synced, active log never replaced
        let evicted = format!("{}\n{}\n", events[0].to_line(), events[1].to_line());
        fs::write(store.archive_path(), &evicted).unwrap();

        assert_eq!(store.rotate(1).unwrap(), 2);

        let archive = fs::read_to_string(store.archive_path()).unwrap();
        assert_eq!(archive, format!("{evicted}{evicted}"));
        assert_eq!(store.read(false).unwrap(), events[2..]);

        let all = store.read(true).unwrap();
        assert_eq!(all.len(), 5);
        for event in &events {
            assert!(all.contains(event));
        }
    }

    #[test]
    fn rotation_keeps_malformed_lines() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        store
            .overwrite("not,a timestamp,at all\n2024-01-01T06:00,awake,no notes\n")
            .unwrap();

        assert_eq!(store.read(true).unwrap().len(), 1);
        assert_eq!(store.rotate(1).unwrap(), 1);

        let archive = fs::read_to_string(store.archive_path()).unwrap();
        assert_eq!(archive, "not,a timestamp,at all\n");
    }

    #[test]
    fn overwrite_is_verbatim_and_append_continues_on_new_line() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        store.append(&nth_event(0)).unwrap();

        store.overwrite("2024-01-01T05:00,asleep,no notes").unwrap();
        assert_eq!(store.read_raw().unwrap(), "2024-01-01T05:00,asleep,no notes");

        store.append(&nth_event(1)).unwrap();
        let events = store.read(false).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].activity, Activity::Asleep);
    }

    #[test]
    fn second_precision_lines_are_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let store = FileLogStore::open_in_dir(temp.path()).unwrap();
        store
            .overwrite("2024-01-01T05:00:30,asleep,no notes\n2024-01-01T06:00,awake,no notes\n")
            .unwrap();

        let events = store.read(false).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].to_line(), "2024-01-01T05:00,asleep,no notes");
    }
}
