//! Client configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_ril_version() -> i32 {
    6
}

fn default_setup_timeout_ms() -> u64 {
    60_000
}

fn default_recovery() -> bool {
    true
}

/// Configuration for a [`RilClient`](crate::RilClient).
///
/// Every field has a default, so an empty YAML document is a valid config.
///
/// ```yaml
/// ril_version: 6
/// setup_timeout_ms: 60000
/// recovery: true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// RIL version spoken by the modem. Selects the SETUP_DATA_CALL reply schema.
    #[serde(default = "default_ril_version")]
    pub ril_version: i32,

    /// How long a tracked SETUP_DATA_CALL may stay unanswered before it is evicted.
    #[serde(default = "default_setup_timeout_ms")]
    pub setup_timeout_ms: u64,

    /// Power-cycle the radio after a spurious setup failure.
    #[serde(default = "default_recovery")]
    pub recovery: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            ril_version: default_ril_version(),
            setup_timeout_ms: default_setup_timeout_ms(),
            recovery: default_recovery(),
        }
    }
}

impl ClientConfig {
    /// Parse a config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Setup timeout as a [`Duration`].
    pub fn setup_timeout(&self) -> Duration {
        Duration::from_millis(self.setup_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = ClientConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.ril_version, 6);
        assert_eq!(config.setup_timeout(), Duration::from_secs(60));
        assert!(config.recovery);
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig::from_yaml_str("ril_version: 4\nrecovery: false\n").unwrap();
        assert_eq!(config.ril_version, 4);
        assert!(!config.recovery);
        assert_eq!(config.setup_timeout_ms, 60_000);
    }

    #[test]
    fn test_invalid_yaml() {
        let err = ClientConfig::from_yaml_str("ril_version: [").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/ril.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
