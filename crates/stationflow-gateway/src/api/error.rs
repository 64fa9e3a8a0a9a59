//! HTTP mapping for the shared error type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use stationflow_core::error::StationFlowError;

/// Handler error; wraps the core error so it can become a response here.
#[derive(Debug)]
pub struct ApiError(pub StationFlowError);

impl From<StationFlowError> for ApiError {
    fn from(e: StationFlowError) -> Self {
        Self(e)
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            StationFlowError::BadRequest(_)
            | StationFlowError::CapacityExceeded { .. }
            | StationFlowError::QuotaExceeded { .. } => StatusCode::BAD_REQUEST,
            StationFlowError::AuthFailed => StatusCode::UNAUTHORIZED,
            StationFlowError::Forbidden(_) => StatusCode::FORBIDDEN,
            StationFlowError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            StationFlowError::NotFound(_) => StatusCode::NOT_FOUND,
            StationFlowError::AlreadyDecided => StatusCode::CONFLICT,
            StationFlowError::UpstreamPersistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            StationFlowError::UnsupportedVersion | StationFlowError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(json!({
            "error": self.0.client_code().as_str(),
            "message": self.0.to_string(),
            "retryable": self.0.is_retryable(),
        }));
        (status, body).into_response()
    }
}
