//! API error taxonomy and its translation to HTTP responses.
//!
//! Handlers return `Result<_, ApiError>`; this module is the single place
//! where errors become status codes and the structured JSON error payloads
//! of the API. Raw error detail goes to the logs, never to the caller as a
//! stack trace.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("Empty request body")]
    EmptyBody,

    #[error("Missing 'question' in request body")]
    MissingQuestion,

    #[error("'question' must be a string")]
    QuestionNotString,

    #[error("Question cannot be empty")]
    EmptyQuestion,

    #[error("Failed to process question")]
    Invocation(#[source] PipelineError),

    #[error("Internal server error")]
    Internal {
        endpoint: &'static str,
        details: String,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::UnsupportedMediaType => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                json!({ "error": self.to_string(), "status": "error" }),
            ),
            ApiError::EmptyBody
            | ApiError::MissingQuestion
            | ApiError::QuestionNotString
            | ApiError::EmptyQuestion => (
                StatusCode::BAD_REQUEST,
                json!({ "error": self.to_string(), "status": "error" }),
            ),
            ApiError::Invocation(source) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": self.to_string(),
                    "details": source.to_string(),
                    "status": "error",
                }),
            ),
            ApiError::Internal { endpoint, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": self.to_string(),
                    "details": details,
                    "endpoint": endpoint,
                    "status": "error",
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        for err in [
            ApiError::EmptyBody,
            ApiError::MissingQuestion,
            ApiError::QuestionNotString,
            ApiError::EmptyQuestion,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn test_media_type_maps_to_415() {
        assert_eq!(
            ApiError::UnsupportedMediaType.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_invocation_maps_to_500() {
        let err = ApiError::Invocation(PipelineError::NotInitialized);
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
