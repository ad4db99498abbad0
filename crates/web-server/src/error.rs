use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use core_types::ValidationError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// The body was not JSON, or was sent without a JSON content type.
    #[error("Malformed request body: {0}")]
    Payload(#[from] JsonRejection),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Client errors carry their message verbatim. Server errors are logged in
/// full and answered with a generic description only.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal database error occurred".to_string(),
                )
            }
            AppError::Internal(message) => {
                tracing::error!(error = %message, "Internal error.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Validation(err) => {
                tracing::debug!(error = %err, "Rejected payload.");
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            AppError::Payload(rejection) => (rejection.status(), rejection.body_text()),
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
