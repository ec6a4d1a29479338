//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use pixelmagix_core::error::{AppError, ErrorKind};
use pixelmagix_plugin::PluginError;

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error type returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub AppError);

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<PluginError> for ApiError {
    fn from(err: PluginError) -> Self {
        Self(err.into())
    }
}

/// Status code and error code for a kind.
pub fn status_for(kind: ErrorKind) -> (StatusCode, &'static str) {
    match kind {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
        ErrorKind::Plugin => (StatusCode::UNPROCESSABLE_ENTITY, "PLUGIN_ERROR"),
        ErrorKind::Serialization => (StatusCode::BAD_REQUEST, "SERIALIZATION_ERROR"),
        ErrorKind::Internal
        | ErrorKind::Database
        | ErrorKind::Storage
        | ErrorKind::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = status_for(self.0.kind);
        if status.is_server_error() {
            tracing::error!(kind = %self.0.kind, error = %self.0, "Internal server error");
        }

        let body = ApiErrorResponse {
            error: error_code.to_string(),
            message: self.0.message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}
