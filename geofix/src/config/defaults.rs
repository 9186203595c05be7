//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `Default` impls for each
//! settings section.

use std::path::PathBuf;

use super::settings::*;
use crate::location::UpdateThrottle;

// =============================================================================
// Location defaults
// =============================================================================

/// Default minimum live update interval (1 second).
pub const DEFAULT_MIN_UPDATE_INTERVAL_MS: u64 =
    UpdateThrottle::DEFAULT_MIN_INTERVAL.as_millis() as u64;

/// Default minimum live update displacement (1 meter).
pub const DEFAULT_MIN_UPDATE_DISTANCE_M: f64 = UpdateThrottle::DEFAULT_MIN_DISTANCE_METERS;

// =============================================================================
// Logging defaults
// =============================================================================

/// Default log directory, relative to the working directory.
pub const DEFAULT_LOG_DIRECTORY: &str = "logs";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "geofix.log";

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            min_update_interval_ms: DEFAULT_MIN_UPDATE_INTERVAL_MS,
            min_update_distance_m: DEFAULT_MIN_UPDATE_DISTANCE_M,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_LOG_DIRECTORY),
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_defaults_match_throttle() {
        let settings = LocationSettings::default();
        assert_eq!(settings.min_update_interval_ms, 1000);
        assert_eq!(settings.min_update_distance_m, 1.0);
    }

    #[test]
    fn test_logging_defaults_match_logging_module() {
        let settings = LoggingSettings::default();
        assert_eq!(
            settings.directory,
            PathBuf::from(crate::logging::default_log_dir())
        );
        assert_eq!(settings.file, crate::logging::default_log_file());
    }
}
