//! Service configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. A `.env` file in the working directory is read first when
//! present; variables already set in the environment win.
//!
//! | Variable                        | Default         |
//! |---------------------------------|-----------------|
//! | `RENTLINE_DB_PATH`              | `./rentline.db` |
//! | `RENTLINE_DB_MAX_CONNECTIONS`   | `5`             |
//! | `RENTLINE_DB_BUSY_TIMEOUT_SECS` | `5`             |
//! | `RENTLINE_DEFAULT_PAGE_SIZE`    | `20`            |

use rentline_core::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use rentline_db::DbConfig;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// SQLite database file (`:memory:` for a throwaway store)
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// How long a writer waits on a locked database
    pub busy_timeout: Duration,

    /// Listing page size when the caller gives none
    pub default_page_size: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            database_path: PathBuf::from("./rentline.db"),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment (and `.env`, if any).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from any variable source.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServiceConfig::default();

        let config = ServiceConfig {
            database_path: lookup("RENTLINE_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: parse_var(&lookup, "RENTLINE_DB_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),

            busy_timeout: parse_var(&lookup, "RENTLINE_DB_BUSY_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.busy_timeout),

            default_page_size: parse_var(&lookup, "RENTLINE_DEFAULT_PAGE_SIZE")?
                .unwrap_or(defaults.default_page_size),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "RENTLINE_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if config.default_page_size == 0 || config.default_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue(
                "RENTLINE_DEFAULT_PAGE_SIZE".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }

        DbConfig::new(&self.database_path)
            .max_connections(self.max_connections)
            .busy_timeout(self.busy_timeout)
    }
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.default_page_size, 20);
    }

    #[test]
    fn test_overrides() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("RENTLINE_DB_PATH", "/var/lib/rentline/ledger.db"),
            ("RENTLINE_DB_MAX_CONNECTIONS", "12"),
            ("RENTLINE_DB_BUSY_TIMEOUT_SECS", " 9 "),
            ("RENTLINE_DEFAULT_PAGE_SIZE", "50"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/var/lib/rentline/ledger.db"));
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.busy_timeout, Duration::from_secs(9));
        assert_eq!(config.default_page_size, 50);

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert!(!db.is_in_memory());
    }

    #[test]
    fn test_invalid_values_name_the_variable() {
        let err = ServiceConfig::from_lookup(lookup(&[("RENTLINE_DB_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for RENTLINE_DB_MAX_CONNECTIONS");

        let err = ServiceConfig::from_lookup(lookup(&[("RENTLINE_DEFAULT_PAGE_SIZE", "500")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name) if name == "RENTLINE_DEFAULT_PAGE_SIZE"));
    }

    #[test]
    fn test_memory_path_uses_in_memory_store() {
        let config = ServiceConfig::from_lookup(lookup(&[("RENTLINE_DB_PATH", ":memory:")])).unwrap();
        assert!(config.db_config().is_in_memory());
    }
}
