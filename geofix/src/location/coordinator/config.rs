//! Coordinator configuration.

use std::time::Duration;

use crate::config::ConfigFile;
use crate::location::platform::UpdateThrottle;

/// Configuration for the location coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoordinatorConfig {
    /// Throttle applied to every live subscription.
    pub throttle: UpdateThrottle,
}

impl From<&ConfigFile> for CoordinatorConfig {
    fn from(config: &ConfigFile) -> Self {
        Self {
            throttle: UpdateThrottle::new(
                Duration::from_millis(config.location.min_update_interval_ms),
                config.location.min_update_distance_m,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_throttle_is_one_second_or_one_meter() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.throttle.min_interval, Duration::from_secs(1));
        assert_eq!(config.throttle.min_distance_meters, 1.0);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.location.min_update_interval_ms = 250;
        file.location.min_update_distance_m = 10.0;

        let config = CoordinatorConfig::from(&file);
        assert_eq!(config.throttle.min_interval, Duration::from_millis(250));
        assert_eq!(config.throttle.min_distance_meters, 10.0);
    }

    #[test]
    fn test_default_config_file_matches_default_throttle() {
        let config = CoordinatorConfig::from(&ConfigFile::default());
        assert_eq!(config, CoordinatorConfig::default());
    }
}
