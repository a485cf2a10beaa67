//! Token claims shared by every algorithm

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Custom payload for tokens that carry only the registered claims
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoCustomClaims {}

/// Registered claims plus an application payload
///
/// `T` is flattened into the top-level JSON object, so its field names must
/// not collide with `sub`, `iss`, `iat`, `exp` or `jti`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims<T = NoCustomClaims> {
    /// Subject
    pub sub: String,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    #[serde(flatten)]
    pub custom: T,
}

impl<T> Claims<T> {
    /// Claims issued now with `exp == iat`; set a lifetime with
    /// [`Claims::expires_in`], or use `JwtManager::claims` for the default
    pub fn new(subject: impl Into<String>, custom: T) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: subject.into(),
            iss: None,
            iat: now,
            exp: now,
            jti: None,
            custom,
        }
    }

    pub fn issued_by(mut self, issuer: impl Into<String>) -> Self {
        self.iss = Some(issuer.into());
        self
    }

    /// Set `exp` relative to `iat`
    pub fn expires_in(mut self, ttl: Duration) -> Self {
        self.exp = self.iat + ttl.num_seconds();
        self
    }

    /// Set an absolute expiry
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.exp = at.timestamp();
        self
    }

    /// Attach a random 128-bit token ID
    pub fn with_token_id(mut self) -> Self {
        let mut id = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut id);
        self.jti = Some(id.iter().map(|b| format!("{b:02x}")).collect());
        self
    }

    /// Expired once `now` is strictly past `exp`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn expires(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn issued(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.iat, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}
