//! Error taxonomy and its transport status table

use serde::{Deserialize, Serialize};
use std::fmt;
use tonic::Code;

/// Closed set of error categories shared by every service
///
/// Each kind maps to exactly one HTTP status and one gRPC code through
/// [`ErrorKind::mapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BadRequest,
    InvalidArgument,
    ValidationFailed,
    Unauthenticated,
    TokenExpired,
    PermissionDenied,
    NotFound,
    MethodNotAllowed,
    AlreadyExists,
    Conflict,
    PreconditionFailed,
    PayloadTooLarge,
    RateLimited,
    Canceled,
    Internal,
    NotImplemented,
    ExternalService,
    Unavailable,
    Timeout,
    DbConnection,
    DbQuery,
    CacheConnection,
    Serialization,
    DataLoss,
}

/// Transport representation of an [`ErrorKind`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    /// HTTP status code
    pub http: u16,
    /// gRPC status code
    pub grpc: Code,
    /// Stable machine-readable code for clients
    pub code: &'static str,
}

const fn map(http: u16, grpc: Code, code: &'static str) -> StatusMapping {
    StatusMapping { http, grpc, code }
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 24] = [
        ErrorKind::BadRequest,
        ErrorKind::InvalidArgument,
        ErrorKind::ValidationFailed,
        ErrorKind::Unauthenticated,
        ErrorKind::TokenExpired,
        ErrorKind::PermissionDenied,
        ErrorKind::NotFound,
        ErrorKind::MethodNotAllowed,
        ErrorKind::AlreadyExists,
        ErrorKind::Conflict,
        ErrorKind::PreconditionFailed,
        ErrorKind::PayloadTooLarge,
        ErrorKind::RateLimited,
        ErrorKind::Canceled,
        ErrorKind::Internal,
        ErrorKind::NotImplemented,
        ErrorKind::ExternalService,
        ErrorKind::Unavailable,
        ErrorKind::Timeout,
        ErrorKind::DbConnection,
        ErrorKind::DbQuery,
        ErrorKind::CacheConnection,
        ErrorKind::Serialization,
        ErrorKind::DataLoss,
    ];

    /// The status table
    pub const fn mapping(self) -> StatusMapping {
        match self {
            Self::BadRequest => map(400, Code::InvalidArgument, "BAD_REQUEST"),
            Self::InvalidArgument => map(400, Code::InvalidArgument, "INVALID_ARGUMENT"),
            Self::ValidationFailed => map(422, Code::InvalidArgument, "VALIDATION_FAILED"),
            Self::Unauthenticated => map(401, Code::Unauthenticated, "UNAUTHENTICATED"),
            Self::TokenExpired => map(401, Code::Unauthenticated, "TOKEN_EXPIRED"),
            Self::PermissionDenied => map(403, Code::PermissionDenied, "PERMISSION_DENIED"),
            Self::NotFound => map(404, Code::NotFound, "NOT_FOUND"),
            Self::MethodNotAllowed => map(405, Code::Unimplemented, "METHOD_NOT_ALLOWED"),
            Self::AlreadyExists => map(409, Code::AlreadyExists, "ALREADY_EXISTS"),
            Self::Conflict => map(409, Code::Aborted, "CONFLICT"),
            Self::PreconditionFailed => map(412, Code::FailedPrecondition, "PRECONDITION_FAILED"),
            Self::PayloadTooLarge => map(413, Code::ResourceExhausted, "PAYLOAD_TOO_LARGE"),
            Self::RateLimited => map(429, Code::ResourceExhausted, "RATE_LIMITED"),
            Self::Canceled => map(499, Code::Cancelled, "CANCELED"),
            Self::Internal => map(500, Code::Internal, "INTERNAL_ERROR"),
            Self::NotImplemented => map(501, Code::Unimplemented, "NOT_IMPLEMENTED"),
            Self::ExternalService => map(502, Code::Unavailable, "EXTERNAL_SERVICE_ERROR"),
            Self::Unavailable => map(503, Code::Unavailable, "SERVICE_UNAVAILABLE"),
            Self::Timeout => map(504, Code::DeadlineExceeded, "TIMEOUT"),
            Self::DbConnection => map(503, Code::Unavailable, "DB_CONNECTION_ERROR"),
            Self::DbQuery => map(500, Code::Internal, "DB_QUERY_ERROR"),
            Self::CacheConnection => map(503, Code::Unavailable, "CACHE_CONNECTION_ERROR"),
            Self::Serialization => map(500, Code::Internal, "SERIALIZATION_ERROR"),
            Self::DataLoss => map(500, Code::DataLoss, "DATA_LOSS"),
        }
    }

    pub const fn http_status(self) -> u16 {
        self.mapping().http
    }

    pub const fn grpc_code(self) -> Code {
        self.mapping().grpc
    }

    pub const fn code(self) -> &'static str {
        self.mapping().code
    }

    /// 4xx kinds: the caller did something wrong
    pub const fn is_client_error(self) -> bool {
        self.http_status() < 500
    }

    /// Kinds where repeating the same call later may succeed
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::RateLimited
                | Self::Unavailable
                | Self::Timeout
                | Self::DbConnection
                | Self::CacheConnection
                | Self::ExternalService
        )
    }

    /// Best-effort reverse of the table, used when a downstream gRPC call
    /// fails and only the status code is known.
    pub fn from_grpc_code(code: Code) -> Self {
        match code {
            Code::InvalidArgument | Code::OutOfRange => Self::InvalidArgument,
            Code::Unauthenticated => Self::Unauthenticated,
            Code::PermissionDenied => Self::PermissionDenied,
            Code::NotFound => Self::NotFound,
            Code::AlreadyExists => Self::AlreadyExists,
            Code::Aborted => Self::Conflict,
            Code::FailedPrecondition => Self::PreconditionFailed,
            Code::ResourceExhausted => Self::RateLimited,
            Code::Cancelled => Self::Canceled,
            Code::Unimplemented => Self::NotImplemented,
            Code::Unavailable => Self::Unavailable,
            Code::DeadlineExceeded => Self::Timeout,
            Code::DataLoss => Self::DataLoss,
            Code::Ok | Code::Unknown | Code::Internal => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
