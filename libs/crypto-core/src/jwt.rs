//! JWT generation, verification and refresh
//!
//! One [`JwtManager`] covers every supported algorithm (HS256, HS384, HS512,
//! RS256, ES256), each either signed-only or signed-and-encrypted.
//!
//! ## Security Design
//!
//! - **Pinned algorithm**: a manager accepts exactly the algorithm it was
//!   built with, so a token cannot downgrade RS256 to HS256
//! - **Signature first**: expiry is only reported for authentic tokens
//! - **Verify-only managers**: services that never issue tokens hold only
//!   the public key
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Duration;
//! use crypto_core::{Claims, JwtManager, NoCustomClaims};
//!
//! let manager = JwtManager::hs256(b"a-very-long-shared-secret-value!").unwrap();
//! let claims = Claims::new("user-42", NoCustomClaims {}).expires_in(Duration::minutes(15));
//!
//! let token = manager.generate_token(&claims).unwrap();
//! let verified: Claims = manager.verify_token(&token).unwrap();
//! assert_eq!(verified.sub, "user-42");
//! ```

use std::borrow::Cow;
use std::fmt;

use chrono::{Duration, Utc};
use config_core::{JwtAlgorithm, JwtConfig};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::encryption::TokenEncryptor;
use crate::error::from_decode_error;
use crate::{Claims, JwtError};

const DEFAULT_TTL_SECS: i64 = 3600;
const DEFAULT_REFRESH_EXTENSION_SECS: i64 = 86400;

/// Anything that can turn a bearer token into verified claims
///
/// Middleware receives this as `Arc<dyn TokenVerifier<T>>`, so tests can
/// substitute a stub without touching global state.
pub trait TokenVerifier<T>: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims<T>, JwtError>;
}

/// Result of [`JwtManager::refresh_token`]
#[derive(Debug, Clone)]
pub struct Refreshed<T> {
    /// The new token, or the original one when it had not expired
    pub token: String,
    pub claims: Claims<T>,
    /// Whether a new token was signed
    pub renewed: bool,
}

/// Signs, encrypts and verifies tokens for one algorithm and key set
#[derive(Clone)]
pub struct JwtManager {
    algorithm: Algorithm,
    encoding_key: Option<EncodingKey>,
    decoding_key: DecodingKey,
    encryptor: Option<TokenEncryptor>,
    issuer: Option<String>,
    default_ttl: Duration,
    refresh_extension: Duration,
}

impl fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtManager")
            .field("algorithm", &self.algorithm)
            .field("can_sign", &self.encoding_key.is_some())
            .field("encrypted", &self.encryptor.is_some())
            .field("issuer", &self.issuer)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl JwtManager {
    fn new(algorithm: Algorithm, encoding_key: Option<EncodingKey>, decoding_key: DecodingKey) -> Self {
        Self {
            algorithm,
            encoding_key,
            decoding_key,
            encryptor: None,
            issuer: None,
            default_ttl: Duration::seconds(DEFAULT_TTL_SECS),
            refresh_extension: Duration::seconds(DEFAULT_REFRESH_EXTENSION_SECS),
        }
    }

    fn hmac(algorithm: Algorithm, secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidKey("HMAC secret must not be empty".to_string()));
        }
        Ok(Self::new(
            algorithm,
            Some(EncodingKey::from_secret(secret)),
            DecodingKey::from_secret(secret),
        ))
    }

    pub fn hs256(secret: &[u8]) -> Result<Self, JwtError> {
        Self::hmac(Algorithm::HS256, secret)
    }

    pub fn hs384(secret: &[u8]) -> Result<Self, JwtError> {
        Self::hmac(Algorithm::HS384, secret)
    }

    pub fn hs512(secret: &[u8]) -> Result<Self, JwtError> {
        Self::hmac(Algorithm::HS512, secret)
    }

    /// RSA signing from PEM keys (PKCS#1 or PKCS#8 private, SPKI public)
    pub fn rs256(private_key_pem: &str, public_key_pem: &str) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("RSA private key: {e}")))?;
        let mut manager = Self::rs256_verifier(public_key_pem)?;
        manager.encoding_key = Some(encoding_key);
        Ok(manager)
    }

    /// RSA verification only
    pub fn rs256_verifier(public_key_pem: &str) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("RSA public key: {e}")))?;
        Ok(Self::new(Algorithm::RS256, None, decoding_key))
    }

    /// ECDSA P-256 signing from PEM keys (PKCS#8 private, SPKI public)
    pub fn es256(private_key_pem: &str, public_key_pem: &str) -> Result<Self, JwtError> {
        let encoding_key = EncodingKey::from_ec_pem(private_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("EC private key: {e}")))?;
        let mut manager = Self::es256_verifier(public_key_pem)?;
        manager.encoding_key = Some(encoding_key);
        Ok(manager)
    }

    /// ECDSA P-256 verification only
    pub fn es256_verifier(public_key_pem: &str) -> Result<Self, JwtError> {
        let decoding_key = DecodingKey::from_ec_pem(public_key_pem.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("EC public key: {e}")))?;
        Ok(Self::new(Algorithm::ES256, None, decoding_key))
    }

    /// Encrypt issued tokens and require encrypted tokens on verify
    pub fn with_encryption(mut self, encryptor: TokenEncryptor) -> Self {
        self.encryptor = Some(encryptor);
        self
    }

    /// Stamp `iss` on issued tokens and require it on verify
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Lifetime used by [`JwtManager::claims`]
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Extension used by [`JwtManager::refresh`]
    pub fn with_refresh_extension(mut self, extension: Duration) -> Self {
        self.refresh_extension = extension;
        self
    }

    /// Build a manager from `JWT_*` configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, JwtError> {
        let manager = match config.algorithm {
            JwtAlgorithm::HS256 => Self::hs256(required_secret(config)?.as_bytes()),
            JwtAlgorithm::HS384 => Self::hs384(required_secret(config)?.as_bytes()),
            JwtAlgorithm::HS512 => Self::hs512(required_secret(config)?.as_bytes()),
            JwtAlgorithm::RS256 => {
                let public = required_public_key(config)?;
                match config.private_key_pem() {
                    Some(private) => Self::rs256(private.expose_secret(), &public),
                    None => Self::rs256_verifier(&public),
                }
            }
            JwtAlgorithm::ES256 => {
                let public = required_public_key(config)?;
                match config.private_key_pem() {
                    Some(private) => Self::es256(private.expose_secret(), &public),
                    None => Self::es256_verifier(&public),
                }
            }
        }?;

        let mut manager = manager
            .with_default_ttl(seconds(config.ttl_secs, "JWT_TTL_SECS")?)
            .with_refresh_extension(seconds(
                config.refresh_extension_secs,
                "JWT_REFRESH_EXTENSION_SECS",
            )?);

        if let Some(issuer) = &config.issuer {
            manager = manager.with_issuer(issuer.clone());
        }
        if let Some(key) = &config.encryption_key {
            manager = manager.with_encryption(TokenEncryptor::from_base64(key.expose_secret())?);
        }

        tracing::info!(
            algorithm = %config.algorithm,
            can_sign = manager.can_sign(),
            encrypted = manager.is_encrypted(),
            "JWT manager initialized"
        );
        Ok(manager)
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn can_sign(&self) -> bool {
        self.encoding_key.is_some()
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryptor.is_some()
    }

    pub fn refresh_extension(&self) -> Duration {
        self.refresh_extension
    }

    /// Claims for `subject` carrying this manager's issuer and default lifetime
    pub fn claims<T>(&self, subject: impl Into<String>, custom: T) -> Claims<T> {
        let claims = Claims::new(subject, custom).expires_in(self.default_ttl);
        match &self.issuer {
            Some(issuer) => claims.issued_by(issuer.clone()),
            None => claims,
        }
    }

    /// Sign `claims`, then encrypt when configured
    ///
    /// Claims without an issuer get the manager's issuer, if it has one.
    pub fn generate_token<T: Serialize>(&self, claims: &Claims<T>) -> Result<String, JwtError> {
        let key = self
            .encoding_key
            .as_ref()
            .ok_or(JwtError::MissingSigningKey)?;
        let header = Header::new(self.algorithm);

        let signed = match (&self.issuer, &claims.iss) {
            (Some(issuer), None) => {
                let mut value =
                    serde_json::to_value(claims).map_err(|e| JwtError::Signing(e.to_string()))?;
                if let Some(map) = value.as_object_mut() {
                    map.insert("iss".to_string(), serde_json::Value::from(issuer.as_str()));
                }
                encode(&header, &value, key)
            }
            _ => encode(&header, claims, key),
        }
        .map_err(|e| JwtError::Signing(e.to_string()))?;

        match &self.encryptor {
            Some(encryptor) => encryptor.encrypt(&signed),
            None => Ok(signed),
        }
    }

    /// Decrypt, check the signature and decode, without the expiry check
    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<Claims<T>, JwtError> {
        let signed = match &self.encryptor {
            Some(encryptor) => Cow::Owned(encryptor.decrypt(token)?),
            None => Cow::Borrowed(token),
        };

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
            // set_issuer alone accepts tokens without `iss`
            validation.required_spec_claims.insert("iss".to_string());
        }

        decode::<Claims<T>>(&signed, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(from_decode_error)
    }

    /// Verify a token and return its claims
    ///
    /// An authentic token past its `exp` yields [`JwtError::Expired`].
    pub fn verify_token<T: DeserializeOwned>(&self, token: &str) -> Result<Claims<T>, JwtError> {
        let claims = self.decode_claims::<T>(token)?;
        if claims.is_expired_at(Utc::now()) {
            return Err(JwtError::Expired {
                expired_at: claims.expires(),
            });
        }
        Ok(claims)
    }

    /// Re-issue an expired token
    ///
    /// An expired but otherwise valid token is re-signed with `iat = now` and
    /// `exp = now + extend_by`. A token that has not expired is returned as
    /// is. Any other failure propagates.
    pub fn refresh_token<T>(&self, token: &str, extend_by: Duration) -> Result<Refreshed<T>, JwtError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut claims = self.decode_claims::<T>(token)?;
        let now = Utc::now();

        if !claims.is_expired_at(now) {
            return Ok(Refreshed {
                token: token.to_string(),
                claims,
                renewed: false,
            });
        }

        claims.iat = now.timestamp();
        claims.exp = claims.iat + extend_by.num_seconds();
        let token = self.generate_token(&claims)?;

        tracing::debug!(sub = %claims.sub, exp = claims.exp, "Re-issued expired token");
        Ok(Refreshed {
            token,
            claims,
            renewed: true,
        })
    }

    /// [`JwtManager::refresh_token`] with the configured extension
    pub fn refresh<T>(&self, token: &str) -> Result<Refreshed<T>, JwtError>
    where
        T: Serialize + DeserializeOwned,
    {
        self.refresh_token(token, self.refresh_extension)
    }
}

impl<T: DeserializeOwned> TokenVerifier<T> for JwtManager {
    fn verify(&self, token: &str) -> Result<Claims<T>, JwtError> {
        self.verify_token(token)
    }
}

fn required_secret(config: &JwtConfig) -> Result<&str, JwtError> {
    config
        .secret
        .as_ref()
        .map(|s| s.expose_secret())
        .ok_or_else(|| JwtError::InvalidKey(format!("JWT_SECRET is required for {}", config.algorithm)))
}

fn required_public_key(config: &JwtConfig) -> Result<String, JwtError> {
    config
        .public_key_pem()
        .ok_or_else(|| JwtError::InvalidKey(format!("JWT_PUBLIC_KEY is required for {}", config.algorithm)))
}

fn seconds(value: u64, name: &str) -> Result<Duration, JwtError> {
    Duration::from_std(std::time::Duration::from_secs(value))
        .map_err(|_| JwtError::InvalidKey(format!("{name} is out of range")))
}
