//! Database configuration

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

use crate::EnvConfig;

/// PostgreSQL connection and pool configuration (`POSTGRES_*`)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_pool_bounds"))]
pub struct PostgresConfig {
    /// Database host
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    /// Database port
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name
    #[validate(length(min = 1))]
    #[serde(default = "default_name")]
    pub database: String,

    /// Database username
    #[validate(length(min = 1))]
    #[serde(default = "default_name")]
    pub user: String,

    /// Database password (secret)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Use SSL/TLS
    #[serde(default)]
    pub sslmode: SslMode,

    /// Maximum number of connections
    #[validate(range(min = 1, max = 1000))]
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[validate(range(max = 1000))]
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Time to wait for a connection from the pool
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Maximum lifetime of a connection in seconds
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_name() -> String {
    "postgres".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_acquire_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_max_lifetime() -> u64 {
    1800
}

fn validate_pool_bounds(config: &PostgresConfig) -> Result<(), ValidationError> {
    if config.min_connections > config.max_connections {
        return Err(ValidationError::new("min_connections_exceeds_max"));
    }
    Ok(())
}

impl EnvConfig for PostgresConfig {
    const PREFIX: &'static str = "POSTGRES_";
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_name(),
            user: default_name(),
            password: None,
            sslmode: SslMode::default(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            max_lifetime_secs: default_max_lifetime(),
        }
    }
}

impl PostgresConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

/// SSL/TLS mode for database connections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SslMode {
    /// No SSL
    #[default]
    Disable,
    /// Use SSL when the server offers it
    Prefer,
    /// SSL required
    Require,
    /// Verify CA certificate
    VerifyCa,
    /// Full verification
    VerifyFull,
}

impl SslMode {
    /// libpq spelling of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        }
    }
}
