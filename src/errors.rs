use crate::services::{
    bucketlist_service::BucketListError, destination_service::CatalogError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 409 Conflict
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, msg)
    }

    /// Shortcut for 422 Unprocessable Entity
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, msg)
    }

    /// Log a storage failure and hide its details from the caller.
    fn storage(err: &sqlx::Error) -> Self {
        tracing::error!("database error: {}", err);
        Self::internal("an internal error occurred")
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::DestinationNotFound(_) => AppError::not_found("Destination not found"),
            CatalogError::LimitTooLarge(_) => AppError::validation(err.to_string()),
            CatalogError::Sqlx(err) => AppError::storage(err),
        }
    }
}

impl From<BucketListError> for AppError {
    fn from(err: BucketListError) -> Self {
        match &err {
            BucketListError::DestinationNotFound(_) => {
                AppError::not_found("Destination not found")
            }
            BucketListError::ItemNotFound(_) => AppError::not_found("Bucket list item not found"),
            BucketListError::AlreadyListed(_) => AppError::conflict("Already in bucket list"),
            BucketListError::Sqlx(err) => AppError::storage(err),
        }
    }
}
