use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::domain::DomainError;

/// HTTP-facing error: every failure becomes `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Client exceeded the auth-route request budget
    #[error("Too many requests, please try again later")]
    RateLimited,

    /// Malformed request body or form
    #[error("{0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Domain(err) => match err {
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                // Duplicates are reported as bad requests, same as validation
                DomainError::Validation(msg) | DomainError::Conflict(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                DomainError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                DomainError::Database(_) | DomainError::Storage(_) | DomainError::Internal(_) => {
                    tracing::error!(error = %err, "Request failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, self.to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}
