//! Server-side JWT Interceptor
//!
//! Extracts and verifies bearer tokens from incoming gRPC requests, storing
//! the verified claims in request extensions.

use std::sync::Arc;

use crypto_core::{Claims, TokenVerifier};
use error_types::{ServiceError, ServiceResult};
use tonic::metadata::MetadataMap;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::{AUTHORIZATION, SYSTEM};

/// Server-side interceptor that verifies JWT tokens and stores the claims
///
/// Verification is delegated to the injected [`TokenVerifier`], so the same
/// interceptor works for every signing algorithm and for encrypted tokens.
/// Every request goes through the same path; there is no bypass.
pub struct JwtServerInterceptor<T> {
    verifier: Arc<dyn TokenVerifier<T>>,
}

impl<T> Clone for JwtServerInterceptor<T> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
        }
    }
}

impl<T> JwtServerInterceptor<T> {
    pub fn new(verifier: Arc<dyn TokenVerifier<T>>) -> Self {
        Self { verifier }
    }

    /// Extract the bearer token from `metadata` and verify it
    ///
    /// ## Errors
    ///
    /// - `Unauthenticated` when the header is missing, not ASCII, not of the
    ///   form `Bearer <token>`, or the token fails verification
    /// - `TokenExpired` when the signature is valid but `exp` has passed
    pub fn authenticate(&self, metadata: &MetadataMap) -> ServiceResult<Claims<T>> {
        let header = metadata.get(AUTHORIZATION).ok_or_else(|| {
            warn!("Missing authorization header");
            ServiceError::unauthenticated(SYSTEM, "Missing authorization header")
        })?;

        let header = header.to_str().map_err(|e| {
            warn!("Invalid authorization header encoding: {}", e);
            ServiceError::unauthenticated(SYSTEM, "Invalid authorization header")
        })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Invalid authorization format (expected 'Bearer <token>')");
            ServiceError::unauthenticated(SYSTEM, "Invalid authorization format")
        })?;

        let claims = self.verifier.verify(token).map_err(|e| {
            warn!(error = %e, "JWT validation failed");
            ServiceError::from(e)
        })?;

        debug!(subject = %claims.sub, "JWT validated successfully");
        Ok(claims)
    }
}

impl<T> Interceptor for JwtServerInterceptor<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let claims = self.authenticate(request.metadata())?;

        // Store claims in request extensions for handler access
        request.extensions_mut().insert(claims);

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_core::{JwtError, NoCustomClaims};
    use error_types::grpc::StatusExt;
    use error_types::ErrorKind;
    use tonic::metadata::MetadataValue;

    /// Accepts exactly one token
    struct StaticVerifier;

    impl TokenVerifier<NoCustomClaims> for StaticVerifier {
        fn verify(&self, token: &str) -> Result<Claims<NoCustomClaims>, JwtError> {
            match token {
                "good" => Ok(Claims::new("user-1", NoCustomClaims {})),
                "stale" => Err(JwtError::Expired {
                    expired_at: chrono::Utc::now(),
                }),
                _ => Err(JwtError::InvalidSignature),
            }
        }
    }

    fn interceptor() -> JwtServerInterceptor<NoCustomClaims> {
        JwtServerInterceptor::new(Arc::new(StaticVerifier))
    }

    fn metadata(value: &'static str) -> MetadataMap {
        let mut metadata = MetadataMap::new();
        metadata.insert(AUTHORIZATION, MetadataValue::from_static(value));
        metadata
    }

    #[test]
    fn test_missing_header() {
        let err = interceptor().authenticate(&MetadataMap::new()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.message(), "Missing authorization header");
    }

    #[test]
    fn test_invalid_format() {
        let err = interceptor()
            .authenticate(&metadata("Token good"))
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
        assert_eq!(err.message(), "Invalid authorization format");
    }

    #[test]
    fn test_valid_token() {
        let claims = interceptor().authenticate(&metadata("Bearer good")).unwrap();
        assert_eq!(claims.sub, "user-1");
    }

    #[test]
    fn test_expired_token_status_carries_code() {
        let mut request = Request::new(());
        *request.metadata_mut() = metadata("Bearer stale");

        let status = interceptor().call(request).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.error_code(), Some("TOKEN_EXPIRED"));
    }

    #[test]
    fn test_forged_token() {
        let mut request = Request::new(());
        *request.metadata_mut() = metadata("Bearer forged");

        let status = interceptor().call(request).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert_eq!(status.error_code(), Some("UNAUTHENTICATED"));
    }

    #[test]
    fn test_interceptor_stores_claims_in_extensions() {
        let mut request = Request::new(());
        *request.metadata_mut() = metadata("Bearer good");

        let request = interceptor().call(request).unwrap();
        let claims = request.extensions().get::<Claims<NoCustomClaims>>();

        assert_eq!(claims.map(|c| c.sub.as_str()), Some("user-1"));
    }
}
