//! Configuration for geofix.
//!
//! User settings live in an INI file at `~/.geofix/config.ini`. Missing
//! files and missing keys fall back to defaults.
//!
//! # Example
//!
//! ```
//! use geofix::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::default();
//! ConfigKey::LocationMinUpdateIntervalMs
//!     .set(&mut config, "500")
//!     .unwrap();
//! assert_eq!(config.location.min_update_interval_ms, 500);
//! ```

mod defaults;
mod file;
mod keys;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, LocationSettings, LoggingSettings};
