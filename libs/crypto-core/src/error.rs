use chrono::{DateTime, Utc};
use error_types::{ErrorKind, ServiceError};
use thiserror::Error;

/// Token and key failures
#[derive(Debug, Error)]
pub enum JwtError {
    /// Signature and structure are valid but the token is past its `exp`
    #[error("Token expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token decryption failed")]
    Decryption,

    #[error("Token encryption failed")]
    Encryption,

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Manager was built from a public key only
    #[error("No signing key configured")]
    MissingSigningKey,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Invalid token issuer")]
    InvalidIssuer,
}

impl JwtError {
    pub fn is_expired(&self) -> bool {
        matches!(self, JwtError::Expired { .. })
    }

    fn kind(&self) -> ErrorKind {
        match self {
            JwtError::Expired { .. } => ErrorKind::TokenExpired,
            JwtError::InvalidSignature
            | JwtError::Malformed(_)
            | JwtError::Decryption
            | JwtError::InvalidIssuer => ErrorKind::Unauthenticated,
            JwtError::Encryption
            | JwtError::InvalidKey(_)
            | JwtError::MissingSigningKey
            | JwtError::Signing(_) => ErrorKind::Internal,
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(error: JwtError) -> Self {
        ServiceError::wrap(error.kind(), "jwt", error)
    }
}

/// Classify a `jsonwebtoken` failure raised while decoding
pub(crate) fn from_decode_error(error: jsonwebtoken::errors::Error) -> JwtError {
    use jsonwebtoken::errors::ErrorKind as Kind;

    match error.kind() {
        Kind::InvalidSignature | Kind::InvalidAlgorithm => JwtError::InvalidSignature,
        Kind::InvalidIssuer => JwtError::InvalidIssuer,
        Kind::MissingRequiredClaim(claim) if claim == "iss" => JwtError::InvalidIssuer,
        Kind::InvalidEcdsaKey | Kind::InvalidRsaKey(_) | Kind::InvalidKeyFormat => {
            JwtError::InvalidKey(error.to_string())
        }
        _ => JwtError::Malformed(error.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_kinds() {
        let expired: ServiceError = JwtError::Expired {
            expired_at: Utc::now(),
        }
        .into();
        assert_eq!(expired.kind(), ErrorKind::TokenExpired);
        assert_eq!(expired.http_status(), 401);
        assert_eq!(expired.system(), "jwt");

        let forged: ServiceError = JwtError::InvalidSignature.into();
        assert_eq!(forged.kind(), ErrorKind::Unauthenticated);

        let setup: ServiceError = JwtError::MissingSigningKey.into();
        assert_eq!(setup.kind(), ErrorKind::Internal);
        assert_eq!(setup.client_message(), "Internal server error");
    }

    #[test]
    fn test_decode_error_classification() {
        use jsonwebtoken::errors::{Error, ErrorKind as Kind};

        assert!(matches!(
            from_decode_error(Error::from(Kind::InvalidSignature)),
            JwtError::InvalidSignature
        ));
        assert!(matches!(
            from_decode_error(Error::from(Kind::InvalidToken)),
            JwtError::Malformed(_)
        ));
        assert!(matches!(
            from_decode_error(Error::from(Kind::InvalidIssuer)),
            JwtError::InvalidIssuer
        ));
    }
}
