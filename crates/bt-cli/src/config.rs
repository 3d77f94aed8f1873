//! Configuration loading and management.

use std::path::{Path, PathBuf};

use bt_core::DEFAULT_RETAIN_COUNT;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the active log.
    pub log_path: PathBuf,

    /// Path to the archive of rotated-out entries.
    pub archive_path: PathBuf,

    /// Number of entries kept in the active log.
    pub retain_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join(bt_store::ACTIVE_FILE),
            archive_path: data_dir.join(bt_store::ARCHIVE_FILE),
            retain_count: DEFAULT_RETAIN_COUNT,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BT_*)
        figment = figment.merge(Env::prefixed("BT_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for bt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bt"))
}

/// Returns the platform-specific data directory for bt.
///
/// On Linux: `~/.local/share/bt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("bt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_bt() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "bt");
    }

    #[test]
    fn test_default_config_uses_data_dir() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("log.txt"));
        assert_eq!(config.archive_path, data_dir.join("archive.txt"));
        assert_eq!(config.retain_count, 100);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"log_path = "/tmp/bt-test/log.txt""#).unwrap();
        writeln!(file, "retain_count = 7").unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.log_path, PathBuf::from("/tmp/bt-test/log.txt"));
        assert_eq!(config.retain_count, 7);
        assert_eq!(config.archive_path, Config::default().archive_path);
    }
}
