use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Invalid mobile number or password")]
    AuthError,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Content not allowed: {reason}")]
    ContentRejected { reason: String },
    #[error("Content moderation service unavailable: {0}")]
    ModerationUnavailable(String),
    #[error("Content moderation timed out")]
    ModerationTimeout,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal server error")]
    Internal,
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Internal server error" }))
            }
            Self::AuthError => {
                tracing::debug!("Authentication failed");
                (StatusCode::UNAUTHORIZED, json!({ "message": "Invalid mobile number or password" }))
            }
            Self::Forbidden(msg) => {
                tracing::debug!(message = %msg, "Forbidden");
                (StatusCode::FORBIDDEN, json!({ "message": msg }))
            }
            Self::NotFound(msg) => {
                tracing::debug!(message = %msg, "Resource not found");
                (StatusCode::NOT_FOUND, json!({ "message": msg }))
            }
            Self::BadRequest(msg) => {
                tracing::debug!(message = %msg, "Bad request");
                (StatusCode::BAD_REQUEST, json!({ "message": msg }))
            }
            Self::Conflict(msg) => {
                tracing::debug!(message = %msg, "Conflict");
                (StatusCode::CONFLICT, json!({ "message": msg }))
            }
            Self::ContentRejected { reason } => {
                tracing::info!(reason = %reason, "Upload rejected by moderation");
                (StatusCode::FORBIDDEN, json!({ "message": "Content not allowed", "reason": reason }))
            }
            Self::ModerationUnavailable(reason) => {
                tracing::warn!(reason = %reason, "Moderation unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({ "message": "Content moderation service error. Please try again.", "reason": reason }),
                )
            }
            Self::ModerationTimeout => {
                tracing::warn!("Moderation timed out");
                (
                    StatusCode::REQUEST_TIMEOUT,
                    json!({ "message": "Content moderation service is taking too long. Please try again." }),
                )
            }
            Self::Storage(e) => {
                tracing::error!(error = %e, "Storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Failed to store file" }))
            }
            Self::Internal => {
                tracing::error!("Internal server error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "message": "Internal server error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}
