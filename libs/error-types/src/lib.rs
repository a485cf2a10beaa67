//! Unified error types for backend services
//!
//! Every failure that crosses a crate boundary is a [`ServiceError`]: an
//! [`ErrorKind`] from a closed taxonomy, a label naming the subsystem that
//! failed, a message and an optional source error. Errors travel as
//! `Result` values and are converted to a transport status once, at the
//! HTTP or gRPC boundary, through the table in [`ErrorKind::mapping`].
//!
//! # Design Principles
//!
//! 1. **Type Safety**: the kind is an enum, never a string
//! 2. **Context Preservation**: errors carry the failing subsystem and source
//! 3. **No leakage**: server-side failures expose only a generic message
//! 4. **Observability**: structured logging with tracing
//!
//! # Example
//! ```rust
//! use error_types::{ErrorKind, ServiceError};
//!
//! let err = ServiceError::not_found("postgres", "user 42 not found");
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert_eq!(err.http_status(), 404);
//! assert_eq!(err.to_status().code(), tonic::Code::NotFound);
//! ```

use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

pub mod grpc;
pub mod http;
mod kind;

pub use http::HttpErrorResponse;
pub use kind::{ErrorKind, StatusMapping};

/// Boxed source error
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core service error type used across all services
#[derive(Debug, Error)]
#[error("[{kind}] {system}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    system: Cow<'static, str>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ServiceError {
    /// Create an error of `kind` raised by `system`
    pub fn new(
        kind: ErrorKind,
        system: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            system: system.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a foreign error, keeping it as the source
    pub fn wrap<E>(kind: ErrorKind, system: impl Into<Cow<'static, str>>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            kind,
            system: system.into(),
            message: error.to_string(),
            source: Some(Box::new(error)),
        }
    }

    /// Attach a source error
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn not_found(system: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, system, message)
    }

    pub fn invalid_argument(
        system: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::InvalidArgument, system, message)
    }

    pub fn unauthenticated(
        system: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Unauthenticated, system, message)
    }

    pub fn permission_denied(
        system: impl Into<Cow<'static, str>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::PermissionDenied, system, message)
    }

    pub fn unavailable(system: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, system, message)
    }

    /// Create internal error from any error type
    pub fn internal<E: Into<anyhow::Error>>(system: impl Into<Cow<'static, str>>, error: E) -> Self {
        let error: anyhow::Error = error.into();
        Self {
            kind: ErrorKind::Internal,
            system: system.into(),
            message: format!("{error:#}"),
            source: Some(error.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Label of the subsystem that raised the error
    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn http_status(&self) -> u16 {
        self.kind.http_status()
    }

    pub fn grpc_code(&self) -> tonic::Code {
        self.kind.grpc_code()
    }

    /// Message safe to return to clients
    ///
    /// Client errors carry their own message; server errors are reduced to a
    /// generic description so that internals never leak.
    pub fn client_message(&self) -> Cow<'_, str> {
        if self.kind.is_client_error() {
            return Cow::Borrowed(&self.message);
        }
        Cow::Borrowed(match self.kind {
            ErrorKind::NotImplemented => "Not implemented",
            ErrorKind::Unavailable
            | ErrorKind::DbConnection
            | ErrorKind::CacheConnection
            | ErrorKind::ExternalService => "Service temporarily unavailable",
            ErrorKind::Timeout => "Operation timed out",
            _ => "Internal server error",
        })
    }

    /// Log error with appropriate level and context
    pub fn log(&self) {
        let source = self.source.as_ref().map(|s| s.to_string());
        match self.kind {
            ErrorKind::Unauthenticated | ErrorKind::TokenExpired | ErrorKind::PermissionDenied => {
                tracing::warn!(
                    kind = %self.kind,
                    system = %self.system,
                    message = %self.message,
                    "Authorization failure"
                );
            }
            ErrorKind::RateLimited => {
                tracing::info!(kind = %self.kind, system = %self.system, "Rate limit hit");
            }
            kind if kind.is_client_error() => {
                tracing::debug!(
                    kind = %self.kind,
                    system = %self.system,
                    message = %self.message,
                    "Client error"
                );
            }
            kind if kind.is_retryable() => {
                tracing::warn!(
                    kind = %self.kind,
                    system = %self.system,
                    message = %self.message,
                    source = ?source,
                    "Dependency issue"
                );
            }
            _ => {
                tracing::error!(
                    kind = %self.kind,
                    system = %self.system,
                    message = %self.message,
                    source = ?source,
                    "Server error"
                );
            }
        }
    }
}

/// Result type alias for Service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Extension trait tagging foreign errors with a kind and subsystem
pub trait ErrorContext<T> {
    /// Wrap the error as `kind` raised by `system`
    fn with_kind(self, kind: ErrorKind, system: &'static str) -> ServiceResult<T>;

    /// Same as [`ErrorContext::with_kind`] with a lazily built message
    /// prefixed to the source error text
    fn with_kind_msg<C, F>(self, kind: ErrorKind, system: &'static str, f: F) -> ServiceResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_kind(self, kind: ErrorKind, system: &'static str) -> ServiceResult<T> {
        self.map_err(|e| ServiceError::wrap(kind, system, e))
    }

    fn with_kind_msg<C, F>(self, kind: ErrorKind, system: &'static str, f: F) -> ServiceResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let message = format!("{}: {}", f(), e);
            ServiceError::new(kind, system, message).with_source(e)
        })
    }
}
