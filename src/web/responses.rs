//! HTTP response helpers
//!
//! Errors leave the service as a status code plus a JSON body of the form
//! `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::errors::AppError;

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Status code with a `{message}` JSON body
pub fn message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(MessageResponse {
            message: message.into(),
        }),
    )
        .into_response()
}

/// Convert AppError to appropriate HTTP response
pub fn handle_error(error: AppError) -> Response {
    match &error {
        AppError::NotFound { resource, .. } => {
            message(StatusCode::NOT_FOUND, format!("No such {resource} found"))
        }
        AppError::Validation { message: text } => message(StatusCode::BAD_REQUEST, text.clone()),
        _ => {
            error!("Request failed: {}", error);
            message(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
        }
    }
}
