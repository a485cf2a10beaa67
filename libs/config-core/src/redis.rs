//! Redis configuration

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::EnvConfig;

/// Redis connection configuration (`REDIS_*`)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct RedisConfig {
    /// Redis host
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    /// Redis port
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database number (0-15)
    #[validate(range(min = 0, max = 15))]
    #[serde(default)]
    pub db: i64,

    /// Username (for ACL)
    #[serde(default)]
    pub username: Option<String>,

    /// Password (if required)
    #[serde(default, skip_serializing)]
    pub password: Option<SecretString>,

    /// Connect over TLS (`rediss://`)
    #[serde(default)]
    pub tls: bool,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_connect_timeout() -> u64 {
    5
}

impl EnvConfig for RedisConfig {
    const PREFIX: &'static str = "REDIS_";
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db: 0,
            username: None,
            password: None,
            tls: false,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl RedisConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
