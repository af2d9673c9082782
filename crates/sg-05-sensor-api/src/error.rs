//! Sensor API error types and their HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{info, warn};

/// Request failure. Responses carry only the status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Body is not declared as JSON
    #[error("Unsupported media type")]
    UnsupportedMediaType,

    /// Malformed request or rejected install key
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Token missing its signature match, expired or otherwise invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Server side failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self::BadRequest(details.into())
    }

    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::Unauthorized(details.into())
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::Internal(details.into())
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            info!(status = status.as_u16(), error = %self, "Request rejected");
        }
        status.into_response()
    }
}
