//! Status command for showing where the log lives and how big it is.

use std::io::Write;

use anyhow::{Context, Result};
use bt_store::FileLogStore;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, store: &FileLogStore, config: &Config) -> Result<()> {
    let counts = store.line_counts().with_context(|| {
        format!("failed to read {}", store.active_path().display())
    })?;

    writeln!(writer, "Baby tracker status")?;
    writeln!(
        writer,
        "Active log: {} ({} entries, keeps {})",
        store.active_path().display(),
        counts.active,
        config.retain_count
    )?;
    writeln!(
        writer,
        "Archive:    {} ({} entries)",
        store.archive_path().display(),
        counts.archive
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use bt_core::{LogStore, Tracker};
    use insta::assert_snapshot;

    #[test]
    fn status_command_outputs_counts() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            log_path: temp.path().join("log.txt"),
            archive_path: temp.path().join("archive.txt"),
            retain_count: 2,
        };
        let store = FileLogStore::open(&config.log_path, &config.archive_path).unwrap();
        store
            .overwrite(
                "2024-03-10T07:00,feeding,no notes\n\
                 2024-03-10T08:00,feeding,no notes\n\
                 2024-03-10T09:00,feeding,no notes\n",
            )
            .unwrap();
        let tracker = Tracker::new(store.clone(), config.retain_count);
        tracker.store().rotate(tracker.retain_count()).unwrap();

        let mut output = Vec::new();
        run(&mut output, &store, &config).unwrap();

        let output = String::from_utf8(output).unwrap();
        let output = output.replace(&temp.path().display().to_string(), "[TEMP]");
        assert_snapshot!(output, @r"
        Baby tracker status
        Active log: [TEMP]/log.txt (2 entries, keeps 2)
        Archive:    [TEMP]/archive.txt (1 entries)
        ");
    }
}
