//! Reading and writing `~/.geofix/config.ini`.
//!
//! A missing file is not an error: callers get [`ConfigFile::default`].
//! Parsing lives in [`super::parser`], serialization in [`super::writer`].

use std::io;
use std::path::{Path, PathBuf};

use ini::Ini;
use thiserror::Error;

use super::parser::parse_ini;
use super::settings::ConfigFile;
use super::writer::to_config_string;

const CONFIG_DIR_NAME: &str = ".geofix";
const CONFIG_FILE_NAME: &str = "config.ini";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but could not be read or is not valid INI.
    #[error("Failed to read config file: {0}")]
    Read(#[from] ini::Error),

    #[error("Failed to create config directory {}: {source}", path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A key holds a value its setting cannot accept.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Load from `~/.geofix/config.ini`.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match Ini::load_from_file(path) {
            Ok(ini) => parse_ini(&ini),
            Err(ini::Error::Io(error)) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(error) => Err(error.into()),
        }
    }

    /// Save to `~/.geofix/config.ini`.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating its parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigFileError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        std::fs::write(path, to_config_string(self)).map_err(|source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Config file saved");
        Ok(())
    }
}

/// `~/.geofix`, or `./.geofix` when the home directory is unknown.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// `~/.geofix/config.ini`.
pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(
            config.location.min_update_interval_ms,
            DEFAULT_MIN_UPDATE_INTERVAL_MS
        );
        assert_eq!(
            config.location.min_update_distance_m,
            DEFAULT_MIN_UPDATE_DISTANCE_M
        );
        assert_eq!(config.logging.file, DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_save_creates_parent_and_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.location.min_update_interval_ms = 30_000;
        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_parent_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let result = ConfigFile::default().save_to(&blocker.join("config.ini"));
        assert!(matches!(
            result,
            Err(ConfigFileError::CreateDirectory { path, .. }) if path == blocker
        ));
    }

    #[test]
    fn test_save_onto_directory() {
        let temp_dir = TempDir::new().unwrap();

        let result = ConfigFile::default().save_to(temp_dir.path());
        assert!(matches!(result, Err(ConfigFileError::Write { .. })));
    }

    #[test]
    fn test_load_directory_is_read_error() {
        let temp_dir = TempDir::new().unwrap();

        let result = ConfigFile::load_from(temp_dir.path());
        assert!(matches!(result, Err(ConfigFileError::Read(_))));
    }

    #[test]
    fn test_config_paths() {
        assert!(config_directory().ends_with(".geofix"));
        assert!(config_file_path().ends_with(".geofix/config.ini"));
    }
}
