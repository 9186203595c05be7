//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// Location acquisition settings
    pub location: LocationSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Location acquisition configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationSettings {
    /// Minimum time between live deliveries, in milliseconds.
    pub min_update_interval_ms: u64,
    /// Minimum displacement between live deliveries, in meters.
    ///
    /// A sample is delivered when either threshold is crossed.
    pub min_update_distance_m: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Directory for log files
    pub directory: PathBuf,
    /// Log file name within `directory`
    pub file: String,
}
