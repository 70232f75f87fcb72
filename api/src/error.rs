use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prep_engine::{ErrorResponse, QuestionError, ServiceError};
use thiserror::Error;

/// Message returned when an upload fails past validation; details stay in the logs.
pub const GENERIC_FAILURE: &str = "An error occurred.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("undefined body")]
    UndefinedBody,
    #[error("{0}")]
    Conflict(String),
    #[error("Upload exceeds the size limit.")]
    PayloadTooLarge,
    #[error("{0}")]
    Remote(String),
    #[error("Deadline exceeded.")]
    DeadlineExceeded,
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            ApiError::UndefinedBody | ApiError::Remote(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Maps an upload failure, hiding the underlying cause from the caller.
    pub fn opaque(error: ServiceError) -> Self {
        match error {
            ServiceError::DeadlineExceeded => ApiError::DeadlineExceeded,
            _ => ApiError::Internal(GENERIC_FAILURE.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<QuestionError> for ApiError {
    fn from(error: QuestionError) -> Self {
        ApiError::BadRequest(error.to_string())
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::DeadlineExceeded => ApiError::DeadlineExceeded,
            other => ApiError::Remote(other.to_string()),
        }
    }
}
