//! Error types for the transform API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pdfsmith_core::TransformError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required part: {0}")]
    MissingFile(&'static str),

    #[error("Invalid request field: {0}")]
    InvalidField(String),

    #[error("Unprocessable document: {0}")]
    Unprocessable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TransformError> for ApiError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Parse(message) => ApiError::Unprocessable(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingFile(field) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required part: {}", field),
            ),
            ApiError::InvalidField(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::Unprocessable(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Unprocessable document: {}", message),
            ),
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
