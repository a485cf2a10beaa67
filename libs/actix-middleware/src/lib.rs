//! # Actix Middleware Library
//!
//! Authentication and request middleware for Actix services
//!
//! ## Modules
//! - `jwt_auth`: bearer-token verification and the [`AuthClaims`] extractor
//! - `permission`: bit-vector permission guard
//! - `logging`: request ID assignment and request/response tracing
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use actix_middleware::{AuthClaims, JwtAuth, Logging, PermissionGuard};
//! use actix_web::{web, App, HttpServer};
//! use crypto_core::{JwtManager, TokenVerifier};
//! use serde::Deserialize;
//!
//! #[derive(Clone, Deserialize)]
//! struct Profile {
//!     permissions: Vec<u8>,
//! }
//!
//! impl authorizer::PermissionBearer<u8> for Profile {
//!     fn permissions(&self) -> &[u8] {
//!         &self.permissions
//!     }
//! }
//!
//! async fn me(claims: AuthClaims<Profile>) -> String {
//!     claims.sub.clone()
//! }
//!
//! # async fn run() -> std::io::Result<()> {
//! let manager = JwtManager::hs256(b"secret-at-least-32-bytes-long!!!").unwrap();
//! let verifier: Arc<dyn TokenVerifier<Profile>> = Arc::new(manager);
//!
//! HttpServer::new(move || {
//!     App::new()
//!         .service(
//!             web::scope("/admin")
//!                 .wrap(PermissionGuard::<Profile, u8>::index(0))
//!                 .route("/me", web::get().to(me)),
//!         )
//!         .wrap(JwtAuth::new(verifier.clone()))
//!         .wrap(Logging)
//! })
//! .bind(("0.0.0.0", 8080))?
//! .run()
//! .await
//! # }
//! ```

pub mod jwt_auth;
pub mod logging;
pub mod permission;

pub use jwt_auth::{AuthClaims, JwtAuth};
pub use logging::{Logging, RequestId, REQUEST_ID_HEADER};
pub use permission::PermissionGuard;

use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{HttpMessage, HttpResponse};
use error_types::{HttpErrorResponse, ServiceError};

/// Subsystem label used on every error raised here
pub const SYSTEM: &str = "http-auth";

/// Short-circuit `req` with a JSON error body, tagged with the request ID
/// when [`Logging`] assigned one
pub(crate) fn reject(req: ServiceRequest, error: ServiceError) -> ServiceResponse {
    error.log();

    let mut body = HttpErrorResponse::from(&error);
    if let Some(id) = req.extensions().get::<RequestId>() {
        body = body.with_request_id(id.as_str());
    }

    let (req, _) = req.into_parts();
    let response = HttpResponse::build(actix_web::ResponseError::status_code(&error)).json(body);
    ServiceResponse::new(req, response)
}
