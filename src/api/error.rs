use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::chunk_store::StoreError;
use crate::services::range::{RangeError, ResolveError};
use crate::services::upload::UploadError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Range Not Satisfiable")]
    RangeNotSatisfiable { length: i64 },

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound("File not found".to_string()),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Validation(e) => AppError::BadRequest(e.message),
            UploadError::TooLarge { .. } => AppError::PayloadTooLarge("File too large".to_string()),
            UploadError::CandidateNotFound(_) => {
                AppError::NotFound("Candidate not found".to_string())
            }
            UploadError::Store(e) => e.into(),
            UploadError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Store(e) => e.into(),
            ResolveError::Range(RangeError::Unsatisfiable { length }) => {
                AppError::RangeNotSatisfiable { length }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            AppError::RangeNotSatisfiable { length } => {
                return (
                    StatusCode::RANGE_NOT_SATISFIABLE,
                    [(header::CONTENT_RANGE, format!("bytes */{length}"))],
                    Json(json!({ "message": "Requested range not satisfiable" })),
                )
                    .into_response();
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "message": message
        }));

        (status, body).into_response()
    }
}
