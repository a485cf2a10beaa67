//! Unified configuration management for backend services
//!
//! This library provides:
//! - Declarative configuration structs decoded from environment variables
//! - One variable prefix per struct (`POSTGRES_HOST`, `JWT_ALGORITHM`, ...)
//! - Optional `.env` loading for local development
//! - Secret management with `secrecy`
//! - Validation and type safety
//!
//! ```
//! use config_core::{EnvConfig, PostgresConfig};
//!
//! let vars = vec![("POSTGRES_HOST".to_string(), "db.internal".to_string())];
//! let config = PostgresConfig::from_iter(vars).unwrap();
//! assert_eq!(config.host, "db.internal");
//! assert_eq!(config.port, 5432);
//! ```

use error_types::{ErrorKind, ServiceError};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use validator::Validate;

pub mod database;
pub mod grpc;
pub mod http;
pub mod observability;
pub mod redis;
pub mod security;

// Re-export commonly used types
pub use database::{PostgresConfig, SslMode};
pub use grpc::GrpcConfig;
pub use http::HttpConfig;
pub use observability::{init_tracing, LogConfig, LogFormat};
pub use redis::RedisConfig;
pub use security::{JwtAlgorithm, JwtConfig};

/// Minimum HMAC secret length accepted in production
pub const MIN_PRODUCTION_SECRET_LEN: usize = 32;

/// Configuration loading failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {prefix}* variables: {source}")]
    Env {
        prefix: &'static str,
        #[source]
        source: envy::Error,
    },

    #[error("Invalid {prefix}* configuration: {source}")]
    Validation {
        prefix: &'static str,
        #[source]
        source: validator::ValidationErrors,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl From<ConfigError> for ServiceError {
    fn from(error: ConfigError) -> Self {
        ServiceError::wrap(ErrorKind::Internal, "config", error)
    }
}

/// Environment type for configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[serde(alias = "loc")]
    Local,
    /// Development server
    #[default]
    #[serde(alias = "dev")]
    Development,
    /// Staging environment
    #[serde(alias = "stage", alias = "stg")]
    Staging,
    /// Production environment
    #[serde(alias = "prod", alias = "prd")]
    Production,
}

impl Environment {
    /// Check if this is a production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Check if this is a local development environment
    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "loc" => Ok(Environment::Local),
            "development" | "dev" => Ok(Environment::Development),
            "staging" | "stage" | "stg" => Ok(Environment::Staging),
            "production" | "prod" | "prd" => Ok(Environment::Production),
            _ => Err(ConfigError::Invalid(format!("Unknown environment: {s}"))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Environment::Local => "local",
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        })
    }
}

/// A configuration struct read from variables sharing one prefix
///
/// Field `max_connections` of a struct with prefix `POSTGRES_` is read from
/// `POSTGRES_MAX_CONNECTIONS`. Missing variables fall back to serde defaults.
pub trait EnvConfig: DeserializeOwned + Validate {
    /// Variable prefix, including the trailing underscore
    const PREFIX: &'static str;

    /// Cross-field checks that `validator` attributes cannot express
    fn check(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Read from the process environment, loading `.env` first if present
    fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Read from explicit `(name, value)` pairs
    fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(Self::PREFIX)
            .from_iter(vars)
            .map_err(|source| ConfigError::Env {
                prefix: Self::PREFIX,
                source,
            })?;

        config.validate().map_err(|source| ConfigError::Validation {
            prefix: Self::PREFIX,
            source,
        })?;
        config.check()?;

        Ok(config)
    }
}

/// Service identity
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ServiceInfo {
    /// Service name, used in logs and as default JWT issuer
    #[validate(length(min = 1))]
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Deployment environment
    #[serde(default)]
    pub environment: Environment,

    /// Service instance ID (for distributed systems)
    #[serde(default)]
    pub instance_id: Option<String>,
}

fn default_service_name() -> String {
    "toolbox".to_string()
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            environment: Environment::default(),
            instance_id: None,
        }
    }
}

impl EnvConfig for ServiceInfo {
    const PREFIX: &'static str = "SERVICE_";
}

/// Every configuration section of a service
///
/// Each section is read from its own prefix; sections a service does not use
/// simply keep their defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service: ServiceInfo,
    pub postgres: PostgresConfig,
    pub redis: RedisConfig,
    pub grpc: GrpcConfig,
    pub http: HttpConfig,
    pub jwt: JwtConfig,
    pub log: LogConfig,
}

impl AppConfig {
    /// Load all sections from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load all sections from explicit `(name, value)` pairs
    pub fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars.into_iter().collect();

        let config = Self {
            service: ServiceInfo::from_iter(vars.iter().cloned())?,
            postgres: PostgresConfig::from_iter(vars.iter().cloned())?,
            redis: RedisConfig::from_iter(vars.iter().cloned())?,
            grpc: GrpcConfig::from_iter(vars.iter().cloned())?,
            http: HttpConfig::from_iter(vars.iter().cloned())?,
            jwt: JwtConfig::from_iter(vars.iter().cloned())?,
            log: LogConfig::from_iter(vars.iter().cloned())?,
        };
        config.check_environment()?;

        tracing::debug!(
            service = %config.service.name,
            environment = %config.service.environment,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Production requires strong token secrets and verified database TLS
    fn check_environment(&self) -> Result<(), ConfigError> {
        if !self.service.environment.is_production() {
            return Ok(());
        }

        if self.jwt.algorithm.is_hmac() {
            let len = self
                .jwt
                .secret
                .as_ref()
                .map_or(0, |s| s.expose_secret().len());
            if len < MIN_PRODUCTION_SECRET_LEN {
                return Err(ConfigError::Invalid(format!(
                    "JWT_SECRET must be at least {MIN_PRODUCTION_SECRET_LEN} bytes in production"
                )));
            }
        }

        if matches!(self.postgres.sslmode, SslMode::Disable) {
            return Err(ConfigError::Invalid(
                "POSTGRES_SSLMODE=disable is not allowed in production".to_string(),
            ));
        }

        Ok(())
    }

    /// Check if running in debug mode
    pub fn is_debug(&self) -> bool {
        !self.service.environment.is_production()
    }
}

/// Turn `(&str, &str)` pairs into the owned pairs `from_iter` expects
pub fn vars<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Vec<(String, String)> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
