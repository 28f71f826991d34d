use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use models::validation::FieldErrors;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

use crate::envelope::Envelope;

pub const INTERNAL_MESSAGE: &str = "Internal server error";
pub const TOO_MANY_REQUESTS_MESSAGE: &str = "Too many requests, please try again later.";

/// Every way a request can end without success, mapped to one HTTP reply.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("malformed request body: {0}")]
    BadBody(String),
    #[error("rate limit exceeded")]
    TooManyRequests,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errors) => ApiError::Validation(errors),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Db(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Validation(errors) => Envelope::fail_errors(errors).with_status(status),
            ApiError::NotFound(msg) | ApiError::BadBody(msg) => Envelope::fail_message(msg).with_status(status),
            ApiError::TooManyRequests => Envelope::fail_message(TOO_MANY_REQUESTS_MESSAGE).with_status(status),
            ApiError::Internal(detail) => {
                // detail stays in the log; clients only see the generic message
                error!(error = %detail, "request failed");
                Envelope::error(INTERNAL_MESSAGE).with_status(status)
            }
        }
    }
}
