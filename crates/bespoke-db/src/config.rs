//! Store configuration.
//!
//! Loaded from environment variables with fallback to defaults. Command
//! line flags in the `bespoke` binary override what is read here.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pool::DbConfig;

/// Where the store lives and how many connections it may open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file (`BESPOKE_DB_PATH`)
    pub database_path: PathBuf,

    /// Pool size (`BESPOKE_DB_MAX_CONNECTIONS`)
    pub max_connections: u32,

    /// Seconds to wait for a connection (`BESPOKE_DB_CONNECT_TIMEOUT_SECS`)
    pub connect_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("./bespoke_bikes.db"),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StoreConfig::default();

        let config = StoreConfig {
            database_path: lookup("BESPOKE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: match lookup("BESPOKE_DB_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("BESPOKE_DB_MAX_CONNECTIONS".to_string())
                })?,
                None => defaults.max_connections,
            },

            connect_timeout_secs: match lookup("BESPOKE_DB_CONNECT_TIMEOUT_SECS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("BESPOKE_DB_CONNECT_TIMEOUT_SECS".to_string())
                })?,
                None => defaults.connect_timeout_secs,
            },
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "BESPOKE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("BESPOKE_DB_PATH".to_string()));
        }

        Ok(config)
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.database_path, PathBuf::from("./bespoke_bikes.db"));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("BESPOKE_DB_PATH", "/var/lib/bespoke/shop.db"),
            ("BESPOKE_DB_MAX_CONNECTIONS", "8"),
            ("BESPOKE_DB_CONNECT_TIMEOUT_SECS", " 5 "),
        ]))
        .unwrap();

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.connect_timeout_secs, 5);

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/var/lib/bespoke/shop.db"));
        assert_eq!(db.max_connections, 8);
        assert_eq!(db.connect_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        let err = StoreConfig::from_lookup(lookup(&[("BESPOKE_DB_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref k) if k == "BESPOKE_DB_MAX_CONNECTIONS"));

        let err = StoreConfig::from_lookup(lookup(&[("BESPOKE_DB_MAX_CONNECTIONS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let err = StoreConfig::from_lookup(lookup(&[("BESPOKE_DB_PATH", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }
}
