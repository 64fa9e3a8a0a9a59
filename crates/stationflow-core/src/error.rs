//! Shared error type across StationFlow crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed body.
    BadRequest,
    /// No caller identity.
    AuthFailed,
    /// Caller lacks the required role.
    Forbidden,
    /// Submission throttle tripped.
    RateLimited,
    /// Proposed availability above station capacity.
    CapacityExceeded,
    /// Daily submission quota used up.
    QuotaExceeded,
    /// Station or request absent.
    NotFound,
    /// Request is no longer pending.
    AlreadyDecided,
    /// Station store write failed.
    UpstreamPersistence,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::AuthFailed => "AUTH_FAILED",
            ClientCode::Forbidden => "FORBIDDEN",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::CapacityExceeded => "CAPACITY_EXCEEDED",
            ClientCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::AlreadyDecided => "ALREADY_DECIDED",
            ClientCode::UpstreamPersistence => "UPSTREAM_PERSISTENCE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StationFlowError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StationFlowError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("auth failed")]
    AuthFailed,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("rate limited")]
    RateLimited,
    #[error("requested availability {requested} exceeds station capacity {capacity}")]
    CapacityExceeded { requested: u32, capacity: u32 },
    #[error("daily limit of {limit} update requests reached")]
    QuotaExceeded { limit: u32 },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request already decided")]
    AlreadyDecided,
    #[error("station persistence failed: {0}")]
    UpstreamPersistence(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl StationFlowError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            StationFlowError::BadRequest(_) => ClientCode::BadRequest,
            StationFlowError::AuthFailed => ClientCode::AuthFailed,
            StationFlowError::Forbidden(_) => ClientCode::Forbidden,
            StationFlowError::RateLimited => ClientCode::RateLimited,
            StationFlowError::CapacityExceeded { .. } => ClientCode::CapacityExceeded,
            StationFlowError::QuotaExceeded { .. } => ClientCode::QuotaExceeded,
            StationFlowError::NotFound(_) => ClientCode::NotFound,
            StationFlowError::AlreadyDecided => ClientCode::AlreadyDecided,
            StationFlowError::UpstreamPersistence(_) => ClientCode::UpstreamPersistence,
            StationFlowError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            StationFlowError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Whether the caller may retry the same call later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StationFlowError::RateLimited | StationFlowError::UpstreamPersistence(_)
        )
    }
}
