//! HTTP-facing error type.
//!
//! Internal failures are logged where they happen; clients only ever see the
//! short messages below.

use crate::models::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub const NOT_JSON: &str = "Request must be JSON";
pub const MISSING_FIELDS: &str = "Missing 'html_data' or 'user_prompt' in JSON payload";
pub const GENERATION_FAILED: &str = "Could not generate locator or an internal error occurred";
pub const PAYLOAD_TOO_LARGE: &str = "Request body exceeds the configured size limit";
pub const RUNTIME_UNAVAILABLE: &str = "Ollama runtime is not responding";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request was unusable; the message is returned to the client.
    BadRequest(String),
    /// The body was larger than the router's body limit.
    PayloadTooLarge,
    /// The model produced nothing or the runtime failed.
    GenerationFailed,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::GenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::PayloadTooLarge => PAYLOAD_TOO_LARGE.to_string(),
            ApiError::GenerationFailed => GENERATION_FAILED.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::BadRequest(NOT_JSON.to_string()),
            // Buffering fails with 413 once the body outgrows `DefaultBodyLimit`.
            other if other.status() == StatusCode::PAYLOAD_TOO_LARGE => ApiError::PayloadTooLarge,
            other => ApiError::BadRequest(format!("Invalid JSON payload: {}", other.body_text())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
