//! HTTP server configuration

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::EnvConfig;

/// HTTP listener configuration (`HTTP_*`)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct HttpConfig {
    /// Bind address
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads (defaults to CPU count)
    #[validate(range(min = 1, max = 1024))]
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl EnvConfig for HttpConfig {
    const PREFIX: &'static str = "HTTP_";
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

impl HttpConfig {
    /// `host:port` suitable for `HttpServer::bind`
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
