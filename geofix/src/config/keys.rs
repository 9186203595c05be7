//! Configuration key access and validation.
//!
//! This module provides a type-safe interface for getting and setting
//! configuration values by key name, with validation via the Specification Pattern.

use std::str::FromStr;
use thiserror::Error;

use super::settings::ConfigFile;
use super::parser::{expand_tilde, parse_file_name, parse_meters, parse_millis};
use super::writer::path_to_string;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Location settings
    LocationMinUpdateIntervalMs,
    LocationMinUpdateDistanceM,

    // Logging settings
    LoggingDirectory,
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "location.min_update_interval_ms" => Ok(ConfigKey::LocationMinUpdateIntervalMs),
            "location.min_update_distance_m" => Ok(ConfigKey::LocationMinUpdateDistanceM),

            "logging.directory" => Ok(ConfigKey::LoggingDirectory),
            "logging.file" => Ok(ConfigKey::LoggingFile),

            _ => Err(ConfigKeyError::UnknownKey(s.to_string())),
        }
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "location.min_update_interval_ms").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::LocationMinUpdateIntervalMs => "location.min_update_interval_ms",
            ConfigKey::LocationMinUpdateDistanceM => "location.min_update_distance_m",
            ConfigKey::LoggingDirectory => "logging.directory",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "location").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "min_update_interval_ms").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LocationMinUpdateIntervalMs => {
                config.location.min_update_interval_ms.to_string()
            }
            ConfigKey::LocationMinUpdateDistanceM => {
                config.location.min_update_distance_m.to_string()
            }
            ConfigKey::LoggingDirectory => path_to_string(&config.logging.directory),
            ConfigKey::LoggingFile => config.logging.file.clone(),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;

        let failed = |reason: &str| ConfigKeyError::ValidationFailed {
            key: self.name().to_string(),
            reason: reason.to_string(),
        };

        match self {
            ConfigKey::LocationMinUpdateIntervalMs => {
                config.location.min_update_interval_ms = parse_millis(value).map_err(failed)?;
            }
            ConfigKey::LocationMinUpdateDistanceM => {
                config.location.min_update_distance_m = parse_meters(value).map_err(failed)?;
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = expand_tilde(value.trim());
            }
            ConfigKey::LoggingFile => {
                config.logging.file = parse_file_name(value).map_err(failed)?;
            }
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value)
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::LocationMinUpdateIntervalMs => Box::new(MillisecondsSpec),
            ConfigKey::LocationMinUpdateDistanceM => Box::new(MetersSpec),
            ConfigKey::LoggingDirectory => Box::new(PathSpec),
            ConfigKey::LoggingFile => Box::new(FileNameSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LocationMinUpdateIntervalMs,
            ConfigKey::LocationMinUpdateDistanceM,
            ConfigKey::LoggingDirectory,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications (Specification Pattern)
// ============================================================================

/// Trait for value validation specifications.
trait ValueSpecification {
    /// Check if the value satisfies this specification.
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// Whole, non-negative milliseconds.
struct MillisecondsSpec;

impl ValueSpecification for MillisecondsSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_millis(value).map(|_| ()).map_err(str::to_string)
    }
}

/// Finite, non-negative meters.
struct MetersSpec;

impl ValueSpecification for MetersSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_meters(value).map(|_| ()).map_err(str::to_string)
    }
}

/// Specification for path values (non-empty).
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

/// Bare file name without directory components.
struct FileNameSpec;

impl ValueSpecification for FileNameSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        parse_file_name(value).map(|_| ()).map_err(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_key_parsing() {
        assert_eq!(
            "location.min_update_interval_ms"
                .parse::<ConfigKey>()
                .unwrap(),
            ConfigKey::LocationMinUpdateIntervalMs
        );
        // Case insensitive
        assert_eq!(
            "LOGGING.FILE".parse::<ConfigKey>().unwrap(),
            ConfigKey::LoggingFile
        );
        assert!("invalid.key".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_key_name_parts() {
        assert_eq!(ConfigKey::LocationMinUpdateDistanceM.section(), "location");
        assert_eq!(
            ConfigKey::LocationMinUpdateDistanceM.key_name(),
            "min_update_distance_m"
        );
        assert_eq!(ConfigKey::LoggingDirectory.section(), "logging");
        assert_eq!(ConfigKey::LoggingDirectory.key_name(), "directory");
    }

    #[test]
    fn test_get_value() {
        let config = ConfigFile::default();

        assert_eq!(ConfigKey::LocationMinUpdateIntervalMs.get(&config), "1000");
        assert_eq!(ConfigKey::LocationMinUpdateDistanceM.get(&config), "1");
        assert_eq!(ConfigKey::LoggingDirectory.get(&config), "logs");
        assert_eq!(ConfigKey::LoggingFile.get(&config), "geofix.log");
    }

    #[test]
    fn test_set_value() {
        let mut config = ConfigFile::default();

        ConfigKey::LocationMinUpdateIntervalMs
            .set(&mut config, "250")
            .unwrap();
        assert_eq!(config.location.min_update_interval_ms, 250);

        ConfigKey::LocationMinUpdateDistanceM
            .set(&mut config, "7.5")
            .unwrap();
        assert_eq!(config.location.min_update_distance_m, 7.5);

        ConfigKey::LoggingDirectory
            .set(&mut config, "/tmp/geofix")
            .unwrap();
        assert_eq!(config.logging.directory, PathBuf::from("/tmp/geofix"));

        ConfigKey::LoggingFile.set(&mut config, "run.log").unwrap();
        assert_eq!(config.logging.file, "run.log");
    }

    #[test]
    fn test_invalid_set_leaves_config_untouched() {
        let mut config = ConfigFile::default();

        let err = ConfigKey::LocationMinUpdateIntervalMs
            .set(&mut config, "-1")
            .unwrap_err();
        assert!(err.to_string().contains("location.min_update_interval_ms"));
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_validate_values() {
        assert!(ConfigKey::LocationMinUpdateIntervalMs.validate("0").is_ok());
        assert!(ConfigKey::LocationMinUpdateIntervalMs
            .validate("1.5")
            .is_err());
        assert!(ConfigKey::LocationMinUpdateDistanceM.validate("0.5").is_ok());
        assert!(ConfigKey::LocationMinUpdateDistanceM
            .validate("far")
            .is_err());
        assert!(ConfigKey::LoggingDirectory.validate("  ").is_err());
        assert!(ConfigKey::LoggingFile.validate("a/b.log").is_err());
    }

    #[test]
    fn test_all_keys_round_trip_names() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
        assert_eq!(ConfigKey::all().len(), 4);
    }
}
