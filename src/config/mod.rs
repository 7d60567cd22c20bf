//! Configuration management for Friendnet
//!
//! Configuration comes from a TOML file or from `FRIENDNET_*`
//! environment variables layered over the defaults. Either way it is
//! validated before use.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::graph::DATABASE_FILE;
use crate::logging::LogLevel;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relationship store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the database file
    pub data_dir: PathBuf,

    /// Database file name inside `data_dir`
    pub database_file: String,

    /// How long a write waits for another connection's lock
    #[serde(with = "humantime_serde")]
    pub busy_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Minimum level; `RUST_LOG` takes precedence when set
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,

    /// Include the event target (module path)
    pub with_target: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            database_file: DATABASE_FILE.to_string(),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Full path of the database file.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            json_format: false,
            with_target: true,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("{key}: {e}")))
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `FRIENDNET_<SECTION>_<KEY>`, for
    /// example `FRIENDNET_STORE_DATA_DIR=/var/lib/friendnet`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or the result
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from the defaults plus whatever `lookup`
    /// returns for each `FRIENDNET_*` key.
    ///
    /// # Errors
    ///
    /// Returns an error if a value cannot be parsed or the result fails
    /// validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Store config
        if let Some(data_dir) = lookup("FRIENDNET_STORE_DATA_DIR") {
            config.store.data_dir = PathBuf::from(data_dir);
        }
        if let Some(file) = lookup("FRIENDNET_STORE_DATABASE_FILE") {
            config.store.database_file = file;
        }
        if let Some(timeout) = lookup("FRIENDNET_STORE_BUSY_TIMEOUT") {
            config.store.busy_timeout = humantime_serde::re::humantime::parse_duration(&timeout)
                .map_err(|e| {
                    ConfigError::InvalidValue(format!("FRIENDNET_STORE_BUSY_TIMEOUT: {e}"))
                })?;
        }

        // Logging config
        if let Some(level) = lookup("FRIENDNET_LOG_LEVEL") {
            config.logging.level = LogLevel::parse(&level).ok_or_else(|| {
                ConfigError::InvalidValue(format!("FRIENDNET_LOG_LEVEL: {level}"))
            })?;
        }
        if let Some(json) = lookup("FRIENDNET_LOG_JSON") {
            config.logging.json_format = parse_bool("FRIENDNET_LOG_JSON", &json)?;
        }
        if let Some(target) = lookup("FRIENDNET_LOG_WITH_TARGET") {
            config.logging.with_target = parse_bool("FRIENDNET_LOG_WITH_TARGET", &target)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// result fails validation.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationFailed`] describing the first
    /// invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.database_file.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "database_file must not be empty".to_string(),
            ));
        }

        if self.store.database_file.contains(['/', '\\']) {
            return Err(ConfigError::ValidationFailed(format!(
                "database_file must be a bare file name: {}",
                self.store.database_file
            )));
        }

        if self.store.busy_timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "busy_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.store.database_path(),
            PathBuf::from("./data").join(DATABASE_FILE)
        );
    }

    #[test]
    fn validation_rejects_bad_store_values() {
        let mut config = Config::default();
        config.store.database_file = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.store.database_file = "nested/graph.db".to_string();
        assert!(config.validate().is_err());

        config = Config::default();
        config.store.busy_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn lookup_overrides_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("FRIENDNET_STORE_DATA_DIR", "/tmp/friendnet"),
            ("FRIENDNET_STORE_BUSY_TIMEOUT", "250ms"),
            ("FRIENDNET_LOG_LEVEL", "debug"),
            ("FRIENDNET_LOG_JSON", "true"),
        ]))
        .unwrap();

        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/friendnet"));
        assert_eq!(config.store.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json_format);
        assert!(config.logging.with_target);
    }

    #[test]
    fn lookup_rejects_unparseable_values() {
        let err = Config::from_lookup(lookup_from(&[("FRIENDNET_LOG_JSON", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));

        let err = Config::from_lookup(lookup_from(&[("FRIENDNET_LOG_LEVEL", "loud")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [store]
            data_dir = "/srv/friendnet"
            busy_timeout = "2s"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.data_dir, PathBuf::from("/srv/friendnet"));
        assert_eq!(config.store.busy_timeout, Duration::from_secs(2));
        assert_eq!(config.store.database_file, DATABASE_FILE);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("friendnet.toml");

        let mut config = Config::default();
        config.logging.level = LogLevel::Warn;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = Config::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }
}
