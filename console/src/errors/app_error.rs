use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::livekit::TokenError;
use crate::store::StoreError;

/// Result type for request handlers
pub type AppResult<T> = Result<T, AppError>;

/// Error returned by API handlers
///
/// Every variant renders as `{"error": "<message>"}`. Internal errors carry a
/// detail string that is logged but never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Referenced resource does not exist. Holds the resource label, e.g. "Agent".
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected failure. `message` is returned, `detail` is only logged.
    #[error("{message}")]
    Internal { message: String, detail: String },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        Self::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidRecord(msg) => AppError::BadRequest(msg),
            StoreError::InvalidPatch => AppError::bad_request("Invalid JSON body"),
            StoreError::Serialization(e) => AppError::internal("Failed to process record", e),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::internal("Failed to generate token", err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::Internal { message, detail } => {
                tracing::error!(status = %status, detail = %detail, "API error: {}", message);
            }
            other => {
                tracing::debug!(status = %status, "API error: {}", other);
            }
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("Phone number");
        assert_eq!(err.to_string(), "Phone number not found");
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_hides_detail() {
        let err = AppError::internal("Failed to fetch agents", "lock poisoned");
        assert_eq!(err.to_string(), "Failed to fetch agents");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_store_error_conversion() {
        let err: AppError = StoreError::InvalidRecord("bad voice".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "bad voice");
    }
}
