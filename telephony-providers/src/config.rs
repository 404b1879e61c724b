//! Provider configuration.
//!
//! ```toml
//! selection_policy = "fail_closed"   # or "reject"
//!
//! [telephony]
//! path = "/data/telephony.db"        # omitted => in-memory
//! busy_timeout_ms = 5000
//!
//! [carrier]
//! path = "/data/carrier.db"
//! ```
//!
//! Every key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::SelectionPolicy;

/// Default `SQLite` busy timeout.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Top-level configuration for [`TelephonyProviders`](crate::TelephonyProviders).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// What providers do with a selection that fails the parenthesis check.
    pub selection_policy: SelectionPolicy,
    /// Database holding `sms`, `threads` and the `conversations` view.
    pub telephony: DatabaseConfig,
    /// Database holding `carrier_key`.
    pub carrier: DatabaseConfig,
}

impl ProviderConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Location and tuning of one `SQLite` database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database file; `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl DatabaseConfig {
    /// In-memory database with default settings.
    #[must_use]
    pub const fn in_memory() -> Self {
        Self {
            path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// File-backed database with default settings.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::in_memory()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ProviderConfig::from_toml_str("").unwrap();
        assert_eq!(config, ProviderConfig::default());
        assert_eq!(config.selection_policy, SelectionPolicy::FailClosed);
        assert_eq!(config.telephony.path, None);
        assert_eq!(config.carrier.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn test_full_config() {
        let config = ProviderConfig::from_toml_str(
            r#"
            selection_policy = "reject"

            [telephony]
            path = "/data/telephony.db"
            busy_timeout_ms = 250

            [carrier]
            path = "/data/carrier.db"
            "#,
        )
        .unwrap();
        assert_eq!(config.selection_policy, SelectionPolicy::Reject);
        assert_eq!(
            config.telephony,
            DatabaseConfig {
                path: Some(PathBuf::from("/data/telephony.db")),
                busy_timeout_ms: 250,
            }
        );
        assert_eq!(config.carrier, DatabaseConfig::file("/data/carrier.db"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(matches!(
            ProviderConfig::from_toml_str("selection_policy = \"fail_closed\"\nstrict = true"),
            Err(ConfigError::Parse(_))
        ));
        assert!(ProviderConfig::from_toml_str("[telephony]\npth = \"x.db\"").is_err());
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(ProviderConfig::from_toml_str("selection_policy = \"ignore\"").is_err());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let err = ProviderConfig::load("/nonexistent/telephony.toml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => {
                assert_eq!(path, PathBuf::from("/nonexistent/telephony.toml"));
            },
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
