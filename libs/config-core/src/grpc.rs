//! gRPC client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::{ConfigError, EnvConfig};

/// Settings for an outbound gRPC channel (`GRPC_*`)
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct GrpcConfig {
    /// Server host
    #[validate(length(min = 1))]
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[validate(range(min = 1))]
    #[serde(default = "default_port")]
    pub port: u16,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// HTTP/2 keep-alive ping interval in seconds
    #[serde(default = "default_keepalive")]
    pub keepalive_secs: u64,

    /// Connect over TLS
    #[serde(default)]
    pub tls: bool,

    /// PEM-encoded CA certificate for TLS
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Domain name to verify the server certificate against
    #[serde(default)]
    pub tls_domain: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    50051
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keepalive() -> u64 {
    60
}

impl EnvConfig for GrpcConfig {
    const PREFIX: &'static str = "GRPC_";

    fn check(&self) -> Result<(), ConfigError> {
        if !self.tls && (self.ca_cert.is_some() || self.tls_domain.is_some()) {
            return Err(ConfigError::Invalid(
                "GRPC_CA_CERT and GRPC_TLS_DOMAIN require GRPC_TLS=true".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            keepalive_secs: default_keepalive(),
            tls: false,
            ca_cert: None,
            tls_domain: None,
        }
    }
}

impl GrpcConfig {
    /// Channel URI, e.g. `http://localhost:50051`
    pub fn uri(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }
}
