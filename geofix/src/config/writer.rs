//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[location]
; Minimum time between live location updates, in milliseconds (default: 1000)
; An update is delivered when this interval has elapsed OR the position
; moved by at least min_update_distance_m.
min_update_interval_ms = {}
; Minimum displacement between live location updates, in meters (default: 1.0)
min_update_distance_m = {}

[logging]
; Directory for log files (default: logs, relative to the working directory)
directory = {}
; Log file name, cleared at the start of every session (default: geofix.log)
file = {}
"#,
        config.location.min_update_interval_ms,
        config.location.min_update_distance_m,
        path_to_string(&config.logging.directory),
        config.logging.file,
    )
}

/// Render a path, abbreviating the home directory as `~`.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
