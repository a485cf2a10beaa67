//! Logging configuration and subscriber setup

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use validator::Validate;

use crate::{ConfigError, EnvConfig};

/// Logging configuration (`LOG_*`)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct LogConfig {
    /// Default filter directive, e.g. `info` or `info,sqlx=warn`.
    /// `RUST_LOG` takes precedence when set.
    #[validate(length(min = 1))]
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format
    #[serde(default)]
    pub format: LogFormat,

    /// Include the event target (module path)
    #[serde(default)]
    pub with_target: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EnvConfig for LogConfig {
    const PREFIX: &'static str = "LOG_";
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            with_target: false,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Install the global tracing subscriber
///
/// Calling this again after a subscriber is installed is a no-op. An invalid
/// filter directive is an error.
pub fn init_tracing(config: &LogConfig) -> Result<(), ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| ConfigError::Logging(format!("invalid level {:?}: {e}", config.level)))?,
    };

    let builder = fmt().with_env_filter(filter).with_target(config.with_target);
    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
    Ok(())
}
