//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [location] section
    if let Some(section) = ini.section(Some("location")) {
        if let Some(v) = section.get("min_update_interval_ms") {
            config.location.min_update_interval_ms = parse_millis(v).map_err(|reason| {
                invalid("location", "min_update_interval_ms", v, reason)
            })?;
        }
        if let Some(v) = section.get("min_update_distance_m") {
            config.location.min_update_distance_m = parse_meters(v).map_err(|reason| {
                invalid("location", "min_update_distance_m", v, reason)
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.directory = expand_tilde(v);
            }
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = parse_file_name(v)
                    .map_err(|reason| invalid("logging", "file", v, reason))?;
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a non-negative whole number of milliseconds.
pub(super) fn parse_millis(value: &str) -> Result<u64, &'static str> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| "must be a non-negative integer number of milliseconds")
}

/// Parse a finite, non-negative distance in meters.
pub(super) fn parse_meters(value: &str) -> Result<f64, &'static str> {
    match value.trim().parse::<f64>() {
        Ok(meters) if meters.is_finite() && meters >= 0.0 => Ok(meters),
        _ => Err("must be a non-negative number of meters"),
    }
}

/// Validate a bare log file name (no directory components).
pub(super) fn parse_file_name(value: &str) -> Result<String, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("must not be empty");
    }
    if value.contains('/') || value.contains('\\') {
        return Err("must be a file name without directories (use logging.directory)");
    }
    Ok(value.to_string())
}

/// Expand a leading `~/` to the user's home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
