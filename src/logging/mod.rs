//! Logging subsystem for Friendnet
//!
//! Installs a global `tracing` subscriber. The level comes from
//! [`LoggingConfig`], unless `RUST_LOG` is set, in which case the
//! environment filter wins.

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

mod level;

pub use level::LogLevel;

/// Errors that can occur in the logging subsystem
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed, or installation failed.
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}

/// Initialize logging with the default configuration
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging with a custom configuration
///
/// # Example
/// ```
/// use friendnet_core::config::LoggingConfig;
/// use friendnet_core::logging::{init_logging_with_config, LogLevel};
///
/// let config = LoggingConfig {
///     level: LogLevel::Debug,
///     ..LoggingConfig::default()
/// };
///
/// init_logging_with_config(&config).expect("Failed to initialize logging");
/// ```
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let fmt_layer = fmt::layer().with_target(config.with_target);

    if config.json_format {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer.json())
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
    }
}
