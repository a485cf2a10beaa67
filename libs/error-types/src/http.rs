//! HTTP error response handling
//!
//! Provides a consistent JSON body for REST errors and, with the `actix`
//! feature, lets handlers return [`ServiceError`] directly.

use serde::{Deserialize, Serialize};

use crate::ServiceError;

/// Standard HTTP error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpErrorResponse {
    /// HTTP status code
    pub status: u16,

    /// Error code for client handling
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Subsystem that raised the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Request ID for tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// Timestamp of the error
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl HttpErrorResponse {
    /// Create new HTTP error response
    pub fn new(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            system: None,
            request_id: None,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Add request ID for tracing
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl From<&ServiceError> for HttpErrorResponse {
    fn from(error: &ServiceError) -> Self {
        let kind = error.kind();
        let mut response =
            HttpErrorResponse::new(kind.http_status(), kind.code(), error.client_message());
        response.system = Some(error.system().to_owned());
        response
    }
}

impl From<ServiceError> for HttpErrorResponse {
    fn from(error: ServiceError) -> Self {
        HttpErrorResponse::from(&error)
    }
}

#[cfg(feature = "actix")]
mod actix {
    use actix_web::http::StatusCode;
    use actix_web::{HttpResponse, ResponseError};

    use super::HttpErrorResponse;
    use crate::ServiceError;

    impl ResponseError for ServiceError {
        fn status_code(&self) -> StatusCode {
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }

        fn error_response(&self) -> HttpResponse {
            self.log();
            HttpResponse::build(self.status_code()).json(HttpErrorResponse::from(self))
        }
    }
}
