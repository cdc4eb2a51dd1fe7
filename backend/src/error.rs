//! Application error handling
//!
//! Converts core, store and generator failures into HTTP responses.

use crate::generator::GeneratorError;
use crate::repositories::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};
use vitatone_shared::types::{ErrorDetail, ErrorResponse};
use vitatone_shared::CoreError;

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => ApiError::Validation(msg),
            CoreError::CollaboratorUnavailable(msg) => ApiError::ServiceUnavailable(msg),
            CoreError::UnparseablePlan(msg) => {
                ApiError::Internal(anyhow::anyhow!("unrecovered unparseable plan: {}", msg))
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connection(msg) => ApiError::ServiceUnavailable(msg),
            StoreError::Validation(msg) => ApiError::Validation(msg),
        }
    }
}

impl From<GeneratorError> for ApiError {
    fn from(err: GeneratorError) -> Self {
        match err {
            GeneratorError::Transient(msg) => ApiError::ServiceUnavailable(msg),
            GeneratorError::Quota(msg) => ApiError::RateLimited(msg),
            GeneratorError::NotConfigured => {
                ApiError::ServiceUnavailable("AI service is not configured".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::ServiceUnavailable(msg) => {
                warn!("Collaborator unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    msg.clone(),
                )
            }
            ApiError::RateLimited(msg) => {
                warn!("Generator quota exceeded: {}", msg);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    "AI service quota exceeded, try again later".to_string(),
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
