//! JWT authentication for gRPC services
//!
//! ## Core Components
//!
//! - **JwtServerInterceptor**: verifies the bearer token on incoming requests
//!   and stores the claims in request extensions
//! - **JwtClientInterceptor**: injects a bearer token into outgoing requests
//! - **JwtClaimsExt**: handler-side access to claims and permission checks
//! - **channel**: builds a client [`tonic::transport::Channel`] from `GRPC_*`
//!   configuration
//!
//! ## Usage Example
//!
//! ### Server Side
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use crypto_core::{JwtManager, NoCustomClaims, TokenVerifier};
//! use grpc_auth::{JwtClaimsExt, JwtServerInterceptor};
//! use tonic::{Request, Response, Status};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let verifier: Arc<dyn TokenVerifier<NoCustomClaims>> =
//!     Arc::new(JwtManager::hs256(b"secret-at-least-32-bytes-long!!!")?);
//! let interceptor = JwtServerInterceptor::new(verifier);
//! // let service = MyServiceServer::with_interceptor(MyService, interceptor);
//! # Ok(())
//! # }
//!
//! async fn whoami(request: Request<()>) -> Result<Response<String>, Status> {
//!     let claims = request.jwt_claims::<NoCustomClaims>()?;
//!     Ok(Response::new(claims.sub.clone()))
//! }
//! ```
//!
//! ### Client Side
//!
//! ```rust,no_run
//! use config_core::GrpcConfig;
//! use grpc_auth::{channel, JwtClientInterceptor};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let channel = channel::connect(&GrpcConfig::default()).await?;
//! let interceptor = JwtClientInterceptor::new("eyJhbGc...")?;
//! let _authed = channel::with_auth(channel, interceptor);
//! // let mut client = UserServiceClient::new(_authed);
//! # Ok(())
//! # }
//! ```
//!
//! Missing, malformed and forged tokens all fail with
//! `Status::unauthenticated`; expired tokens carry the `TOKEN_EXPIRED` error
//! code in the `x-error-code` metadata so clients can refresh.

pub mod channel;
mod client;
mod extensions;
mod server;

pub use client::JwtClientInterceptor;
pub use extensions::JwtClaimsExt;
pub use server::JwtServerInterceptor;

// Re-export tonic Status for convenience
pub use tonic::Status;

/// Metadata key carrying the bearer token
pub const AUTHORIZATION: &str = "authorization";

/// Subsystem label used on every error raised here
pub const SYSTEM: &str = "grpc-auth";
