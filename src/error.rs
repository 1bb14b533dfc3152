use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldErrors;

/// Request-level failure taxonomy. Every handler converges to one of these at
/// its boundary; internal causes are logged here and never leak to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("access to this entity is forbidden")]
    Forbidden,
    #[error("entity not found")]
    NotFound,
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Internal(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "status": "unauthorized", "message": message })),
            )
                .into_response(),
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "status": "forbidden",
                    "message": "access to this entity is forbidden",
                })),
            )
                .into_response(),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "status": "not_found", "message": "Entity not found" })),
            )
                .into_response(),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "failed",
                    "message": "Validation failed",
                    "error": errors,
                })),
            )
                .into_response(),
            AppError::Internal(cause) => {
                error!(error = %cause, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "status": "failed",
                        "message": "internal_server_error",
                    })),
                )
                    .into_response()
            }
        }
    }
}
