//! Client-side JWT Interceptor
//!
//! Injects a bearer token into outgoing gRPC requests via metadata.

use error_types::{ServiceError, ServiceResult};
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tonic::service::Interceptor;
use tonic::{Request, Status};

use crate::{AUTHORIZATION, SYSTEM};

/// Client-side interceptor that adds `authorization: Bearer {token}` to every
/// outgoing request
///
/// The header value is parsed once at construction and cloned per request.
#[derive(Clone, Debug)]
pub struct JwtClientInterceptor {
    auth_header: AsciiMetadataValue,
}

impl JwtClientInterceptor {
    /// Create an interceptor for `token` (without the `Bearer ` prefix)
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if the token is not valid ASCII metadata. Tokens
    /// produced by `JwtManager` are always base64url and never fail.
    pub fn new(token: impl AsRef<str>) -> ServiceResult<Self> {
        let value = format!("Bearer {}", token.as_ref());
        let auth_header = AsciiMetadataValue::try_from(value).map_err(|_| {
            ServiceError::invalid_argument(SYSTEM, "Token contains invalid header characters")
        })?;

        Ok(Self { auth_header })
    }

    /// Wrap an already-parsed header, e.g. one forwarded from an incoming
    /// request
    pub fn from_header(auth_header: AsciiMetadataValue) -> Self {
        Self { auth_header }
    }

    /// Build an interceptor that forwards the caller's credentials
    pub fn forward(metadata: &MetadataMap) -> Result<Self, Status> {
        Self::extract_from_metadata(metadata).map(|header| Self::from_header(header.clone()))
    }

    /// The raw `authorization` value of an incoming request
    pub fn extract_from_metadata(metadata: &MetadataMap) -> Result<&AsciiMetadataValue, Status> {
        metadata
            .get(AUTHORIZATION)
            .ok_or_else(|| Status::unauthenticated("Missing authorization header"))
    }
}

impl Interceptor for JwtClientInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        request
            .metadata_mut()
            .insert(AUTHORIZATION, self.auth_header.clone());

        Ok(request)
    }
}
