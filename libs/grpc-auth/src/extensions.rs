//! Request Extension Trait for JWT Claims Access

use authorizer::{PermissionBearer, PermissionWord};
use crypto_core::Claims;
use tonic::{Request, Status};

/// Handler-side access to the claims stored by
/// [`JwtServerInterceptor`](crate::JwtServerInterceptor)
///
/// ```rust,no_run
/// use grpc_auth::JwtClaimsExt;
/// use serde::Deserialize;
/// use tonic::{Request, Response, Status};
///
/// #[derive(Clone, Deserialize)]
/// struct Profile {
///     permissions: Vec<u8>,
/// }
///
/// impl authorizer::PermissionBearer<u8> for Profile {
///     fn permissions(&self) -> &[u8] {
///         &self.permissions
///     }
/// }
///
/// const DELETE_POST: usize = 3;
///
/// async fn delete_post(request: Request<()>) -> Result<Response<()>, Status> {
///     let required = authorizer::generate::<u8>(DELETE_POST);
///     request.require_permission::<Profile, u8>(&required)?;
///     Ok(Response::new(()))
/// }
/// ```
pub trait JwtClaimsExt {
    /// Verified claims, or `Status::unauthenticated` when the interceptor was
    /// not attached
    fn jwt_claims<T>(&self) -> Result<&Claims<T>, Status>
    where
        T: Send + Sync + 'static;

    /// Require that the subject matches `subject`
    fn require_subject<T>(&self, subject: &str) -> Result<&Claims<T>, Status>
    where
        T: Send + Sync + 'static;

    /// Require that the claims' permission vector overlaps `required`
    fn require_permission<T, W>(&self, required: &[W]) -> Result<&Claims<T>, Status>
    where
        T: PermissionBearer<W> + Send + Sync + 'static,
        W: PermissionWord;
}

impl<B> JwtClaimsExt for Request<B> {
    fn jwt_claims<T>(&self) -> Result<&Claims<T>, Status>
    where
        T: Send + Sync + 'static,
    {
        self.extensions()
            .get::<Claims<T>>()
            .ok_or_else(|| Status::unauthenticated("No JWT claims found in request"))
    }

    fn require_subject<T>(&self, subject: &str) -> Result<&Claims<T>, Status>
    where
        T: Send + Sync + 'static,
    {
        let claims = self.jwt_claims::<T>()?;
        if claims.sub == subject {
            Ok(claims)
        } else {
            Err(Status::permission_denied(
                "Access denied: resource belongs to another subject",
            ))
        }
    }

    fn require_permission<T, W>(&self, required: &[W]) -> Result<&Claims<T>, Status>
    where
        T: PermissionBearer<W> + Send + Sync + 'static,
        W: PermissionWord,
    {
        let claims = self.jwt_claims::<T>()?;
        if claims.custom.has_permission(required) {
            Ok(claims)
        } else {
            tracing::debug!(subject = %claims.sub, "Permission check failed");
            Err(Status::permission_denied("Insufficient permissions"))
        }
    }
}
