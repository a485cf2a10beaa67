//! gRPC-specific error handling
//!
//! Converts [`ServiceError`] into [`tonic::Status`] through the kind table and
//! carries the stable error code and failing subsystem as trailing metadata,
//! so a downstream caller can rebuild the original kind.

use std::time::Duration;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::Status;

use crate::{ErrorKind, ServiceError};

/// Metadata key holding the stable error code
pub const ERROR_CODE_KEY: &str = "x-error-code";
/// Metadata key holding the subsystem label
pub const SYSTEM_KEY: &str = "x-system";
/// Metadata key holding a retry hint in seconds
pub const RETRY_AFTER_KEY: &str = "x-retry-after";

/// Extension trait for adding metadata to gRPC Status
pub trait StatusExt {
    /// Add retry info to status
    fn with_retry_info(self, retry_after: Duration) -> Self;

    /// Add error code for client handling
    fn with_error_code(self, code: &str) -> Self;

    /// Stable error code set by [`StatusExt::with_error_code`], if any
    fn error_code(&self) -> Option<&str>;
}

impl StatusExt for Status {
    fn with_retry_info(self, retry_after: Duration) -> Self {
        with_metadata(self, RETRY_AFTER_KEY, &retry_after.as_secs().to_string())
    }

    fn with_error_code(self, code: &str) -> Self {
        with_metadata(self, ERROR_CODE_KEY, code)
    }

    fn error_code(&self) -> Option<&str> {
        self.metadata()
            .get(ERROR_CODE_KEY)
            .and_then(|value| value.to_str().ok())
    }
}

/// Values that are not valid ASCII metadata are dropped
fn with_metadata(mut status: Status, key: &'static str, value: &str) -> Status {
    match value.parse::<MetadataValue<Ascii>>() {
        Ok(parsed) => {
            status.metadata_mut().insert(key, parsed);
        }
        Err(_) => {
            tracing::debug!(key, "Skipping non-ASCII status metadata");
        }
    }
    status
}

impl ServiceError {
    /// Convert to a gRPC status with the client-safe message
    pub fn to_status(&self) -> Status {
        let kind = self.kind();
        let status = Status::new(kind.grpc_code(), self.client_message())
            .with_error_code(kind.code());
        let status = with_metadata(status, SYSTEM_KEY, self.system());

        if kind == ErrorKind::RateLimited {
            status.with_retry_info(Duration::from_secs(1))
        } else {
            status
        }
    }
}

impl From<ServiceError> for Status {
    fn from(error: ServiceError) -> Self {
        error.to_status()
    }
}

impl From<&ServiceError> for Status {
    fn from(error: &ServiceError) -> Self {
        error.to_status()
    }
}

/// Rebuild a [`ServiceError`] from a status returned by a downstream call
///
/// The kind comes from the `x-error-code` metadata when present and falls
/// back to the reverse status table otherwise.
impl From<Status> for ServiceError {
    fn from(status: Status) -> Self {
        let kind = status
            .error_code()
            .and_then(|code| ErrorKind::ALL.into_iter().find(|k| k.code() == code))
            .unwrap_or_else(|| ErrorKind::from_grpc_code(status.code()));

        let system = status
            .metadata()
            .get(SYSTEM_KEY)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| "grpc".to_owned());

        ServiceError::new(kind, system, status.message().to_owned()).with_source(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_status_carries_code_and_system() {
        let error = ServiceError::permission_denied("authz", "missing bit 7");
        let status = error.to_status();

        assert_eq!(status.code(), Code::PermissionDenied);
        assert_eq!(status.message(), "missing bit 7");
        assert_eq!(status.error_code(), Some("PERMISSION_DENIED"));
        assert_eq!(
            status.metadata().get(SYSTEM_KEY).unwrap().to_str().unwrap(),
            "authz"
        );
    }

    #[test]
    fn test_internal_status_hides_message() {
        let error = ServiceError::new(ErrorKind::DbQuery, "postgres", "relation \"users\" does not exist");
        let status: Status = error.into();

        assert_eq!(status.code(), Code::Internal);
        assert_eq!(status.message(), "Internal server error");
        assert_eq!(status.error_code(), Some("DB_QUERY_ERROR"));
    }

    #[test]
    fn test_status_round_trip_keeps_kind() {
        let error = ServiceError::new(ErrorKind::TokenExpired, "jwt", "token expired");
        let rebuilt = ServiceError::from(error.to_status());

        assert_eq!(rebuilt.kind(), ErrorKind::TokenExpired);
        assert_eq!(rebuilt.system(), "jwt");
    }

    #[test]
    fn test_plain_status_uses_reverse_table() {
        let rebuilt = ServiceError::from(Status::not_found("no such user"));

        assert_eq!(rebuilt.kind(), ErrorKind::NotFound);
        assert_eq!(rebuilt.system(), "grpc");
        assert_eq!(rebuilt.message(), "no such user");
    }

    #[test]
    fn test_status_with_retry_info() {
        let status = Status::resource_exhausted("Rate limited")
            .with_retry_info(Duration::from_secs(60));

        assert_eq!(
            status.metadata().get(RETRY_AFTER_KEY).unwrap().to_str().unwrap(),
            "60"
        );
    }

    #[test]
    fn test_non_ascii_system_is_skipped() {
        let error = ServiceError::not_found("système", "missing");
        let status = error.to_status();

        assert!(status.metadata().get(SYSTEM_KEY).is_none());
        assert_eq!(status.error_code(), Some("NOT_FOUND"));
    }
}
