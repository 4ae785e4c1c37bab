// src/session/config.rs

//! Session configuration, loadable from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::common::timing;
use crate::stream::IterationPolicy;

/// Errors while loading a [`SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables of one instrument session.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// read_timeout_ms = 2000
/// iteration_policy = "drop_and_retry"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Serial baud rate.
    pub baud_rate: u32,
    /// Per-read timeout while streaming or collecting a query reply.
    pub read_timeout_ms: u64,
    /// Timeout for the system message that follows a command.
    pub ack_timeout_ms: u64,
    pub iteration_policy: IterationPolicy,
    /// Retry bound under `drop_and_retry`.
    pub max_consecutive_failures: u32,
    /// Treat a missing or negative acknowledge as an error instead of a warning.
    pub strict_acks: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            baud_rate: timing::DEFAULT_BAUD_RATE,
            read_timeout_ms: timing::DEFAULT_READ_TIMEOUT.as_millis() as u64,
            ack_timeout_ms: timing::DEFAULT_ACK_TIMEOUT.as_millis() as u64,
            iteration_policy: IterationPolicy::default(),
            max_consecutive_failures: timing::DEFAULT_MAX_CONSECUTIVE_FAILURES,
            strict_acks: false,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    #[inline]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    #[inline]
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.read_timeout(), Duration::from_secs(1));
        assert_eq!(config.iteration_policy, IterationPolicy::DropAndAdvance);
        assert!(!config.strict_acks);
    }

    #[test]
    fn test_partial_toml() {
        let config = SessionConfig::from_toml_str(
            "read_timeout_ms = 250\niteration_policy = \"drop_and_retry\"\nstrict_acks = true\n",
        )
        .unwrap();
        assert_eq!(config.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.iteration_policy, IterationPolicy::DropAndRetry);
        assert!(config.strict_acks);
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        let err = SessionConfig::from_toml_str("iteration_policy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "baud_rate = 115200").unwrap();
        let config = SessionConfig::load(file.path()).unwrap();
        assert_eq!(config.baud_rate, 115200);
    }

    #[test]
    fn test_missing_file() {
        let err = SessionConfig::load("/nonexistent/isx3.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
