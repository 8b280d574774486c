//! Operator configuration, persisted with confy.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const APP_NAME: &str = "liveview";
const CONFIG_NAME: &str = "config";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveViewConfig {
    /// Quiet period in milliseconds between the last visibility event and
    /// the reconciliation pass. Lower means faster convergence, higher means
    /// fewer passes under event storms.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Whether reconciliation is activated as soon as the service starts.
    #[serde(default = "default_active_on_start")]
    pub active_on_start: bool,
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_active_on_start() -> bool {
    true
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            active_on_start: default_active_on_start(),
        }
    }
}

impl LiveViewConfig {
    pub fn load() -> Self {
        confy::load(APP_NAME, CONFIG_NAME).unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quiet_period_is_100ms() {
        let config = LiveViewConfig::default();
        assert_eq!(config.debounce(), Duration::from_millis(100));
        assert!(config.active_on_start);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: LiveViewConfig = toml::from_str("").unwrap();
        assert_eq!(config.debounce_ms, 100);
        assert!(config.active_on_start);
    }
}
