//! Axum-specific error types and mappings.
//!
//! Maps `DetectError` to HTTP status codes and a JSON body for the API
//! routes. The HTML routes render their errors into the page instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sonar_core::DetectError;
use thiserror::Error;

/// Axum-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The signal text did not parse.
    #[error("Invalid signal: {0}")]
    InvalidSignal(String),

    /// Training failed at startup; nothing can be classified.
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
    /// Stable error type discriminant for client-side handling
    #[serde(rename = "type")]
    error_type: &'static str,
}

impl HttpError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidSignal(_) => StatusCode::BAD_REQUEST,
            Self::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidSignal(_) => "INVALID_SIGNAL",
            Self::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_type = self.error_type();
        let message = match self {
            Self::InvalidSignal(msg) | Self::ModelUnavailable(msg) | Self::Internal(msg) => msg,
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %message, "Request failed");
        }

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
            error_type,
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<DetectError> for HttpError {
    fn from(err: DetectError) -> Self {
        match err {
            DetectError::Input(input) => Self::InvalidSignal(input.to_string()),
            DetectError::ModelUnavailable(reason) => Self::ModelUnavailable(reason),
        }
    }
}

impl From<tokio::task::JoinError> for HttpError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Blocking task failed: {err}"))
    }
}
