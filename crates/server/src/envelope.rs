//! Uniform response body: `{status, data?, message?, errors?}`.
//!
//! - `success`: the operation completed; `data` carries the result.
//! - `fail`: the client is at fault (4xx); `errors` or `message` says why.
//! - `error`: the server is at fault (5xx); `message` is always generic.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::validation::{FieldError, FieldErrors};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T = ()> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self { status: Status::Success, data: Some(data), message: None, errors: None }
    }

    /// Pair the body with an HTTP status.
    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

impl Envelope<()> {
    pub fn success_message(message: impl Into<String>) -> Self {
        Self { status: Status::Success, data: None, message: Some(message.into()), errors: None }
    }

    pub fn fail_message(message: impl Into<String>) -> Self {
        Self { status: Status::Fail, data: None, message: Some(message.into()), errors: None }
    }

    pub fn fail_errors(errors: FieldErrors) -> Self {
        Self { status: Status::Fail, data: None, message: None, errors: Some(errors.into_vec()) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: Status::Error, data: None, message: Some(message.into()), errors: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_carries_data_only() {
        let v = serde_json::to_value(Envelope::success(vec![1, 2])).unwrap();
        assert_eq!(v, json!({"status": "success", "data": [1, 2]}));
    }

    #[test]
    fn fail_with_field_errors() {
        let v = serde_json::to_value(Envelope::fail_errors(FieldErrors::single("name", "Required"))).unwrap();
        assert_eq!(v, json!({"status": "fail", "errors": [{"field": "name", "message": "Required"}]}));
    }

    #[test]
    fn error_is_message_only() {
        let v = serde_json::to_value(Envelope::error("Internal server error")).unwrap();
        assert_eq!(v, json!({"status": "error", "message": "Internal server error"}));
    }

    #[test]
    fn confirmation_message() {
        let v = serde_json::to_value(Envelope::success_message("Product deleted successfully")).unwrap();
        assert_eq!(v, json!({"status": "success", "message": "Product deleted successfully"}));
    }
}
