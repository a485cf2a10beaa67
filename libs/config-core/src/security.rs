//! Token signing configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use validator::Validate;

use crate::{ConfigError, EnvConfig};

/// JWT configuration (`JWT_*`)
///
/// PEM keys may be given with literal `\n` sequences so they fit in a single
/// environment variable.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct JwtConfig {
    /// Signing algorithm
    #[serde(default)]
    pub algorithm: JwtAlgorithm,

    /// Shared secret for HMAC algorithms
    #[serde(default, skip_serializing)]
    pub secret: Option<SecretString>,

    /// PEM private key for RS256 / ES256 signing
    #[serde(default, skip_serializing)]
    pub private_key: Option<SecretString>,

    /// PEM public key for RS256 / ES256 verification
    #[serde(default)]
    pub public_key: Option<String>,

    /// Base64-encoded 32-byte key; when set tokens are also encrypted
    #[serde(default, skip_serializing)]
    pub encryption_key: Option<SecretString>,

    /// Expected `iss` claim
    #[serde(default)]
    pub issuer: Option<String>,

    /// Token lifetime in seconds
    #[validate(range(min = 1))]
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How far a refresh pushes expiry forward, in seconds
    #[validate(range(min = 1))]
    #[serde(default = "default_refresh_extension")]
    pub refresh_extension_secs: u64,
}

fn default_ttl() -> u64 {
    3600
}

fn default_refresh_extension() -> u64 {
    86400
}

impl EnvConfig for JwtConfig {
    const PREFIX: &'static str = "JWT_";

    fn check(&self) -> Result<(), ConfigError> {
        if self.algorithm.is_hmac() && (self.private_key.is_some() || self.public_key.is_some()) {
            return Err(ConfigError::Invalid(format!(
                "{} uses JWT_SECRET, not PEM keys",
                self.algorithm
            )));
        }
        if !self.algorithm.is_hmac() && self.secret.is_some() {
            return Err(ConfigError::Invalid(format!(
                "{} uses PEM keys, not JWT_SECRET",
                self.algorithm
            )));
        }
        Ok(())
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::default(),
            secret: None,
            private_key: None,
            public_key: None,
            encryption_key: None,
            issuer: None,
            ttl_secs: default_ttl(),
            refresh_extension_secs: default_refresh_extension(),
        }
    }
}

impl JwtConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn refresh_extension(&self) -> Duration {
        Duration::from_secs(self.refresh_extension_secs)
    }

    /// Private key PEM with escaped newlines restored
    pub fn private_key_pem(&self) -> Option<SecretString> {
        self.private_key
            .as_ref()
            .map(|key| SecretString::from(unescape_pem(key.expose_secret())))
    }

    /// Public key PEM with escaped newlines restored
    pub fn public_key_pem(&self) -> Option<String> {
        self.public_key.as_deref().map(unescape_pem)
    }

    /// Whether issued tokens are encrypted as well as signed
    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }
}

fn unescape_pem(pem: &str) -> String {
    pem.replace("\\n", "\n")
}

/// JWT signing algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum JwtAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
    RS256,
    ES256,
}

impl JwtAlgorithm {
    /// Shared-secret algorithms
    pub fn is_hmac(&self) -> bool {
        matches!(self, Self::HS256 | Self::HS384 | Self::HS512)
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
