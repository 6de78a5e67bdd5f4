//! HTTP API for the chatbot service.
//!
//! - POST /api/chat   — validate the request, invoke the pipeline, format
//! - GET  /api/health — report whether the pipeline handle is present
//!
//! The chat route carries a panic-catching layer as the last line of
//! defense; under normal validated flow every failure is a typed
//! [`ApiError`].

use std::any::Any;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use uuid::Uuid;

use crate::format::format_output;
use crate::pipeline::{ChatPipeline, PipelineError};
use crate::server::error::ApiError;

/// Application state shared across handlers.
///
/// `pipeline` is `None` only when the service was assembled without a
/// working pipeline; the production boot path is fail-fast and always
/// serves with `Some`.
pub struct AppState {
    pub pipeline: Option<Arc<ChatPipeline>>,
}

/// Build the axum router with all API routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(chat).layer(CatchPanicLayer::custom(panic_to_response("chat"))),
        )
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ─── Response Types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: &'static str,
    pub chatbot_initialized: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    if !is_json_content_type(&headers) {
        return Err(ApiError::UnsupportedMediaType);
    }

    let data: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let object = match data.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(ApiError::EmptyBody),
    };

    let question = object.get("question").ok_or(ApiError::MissingQuestion)?;
    let question = question.as_str().ok_or(ApiError::QuestionNotString)?.trim();
    if question.is_empty() {
        return Err(ApiError::EmptyQuestion);
    }

    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or(ApiError::Invocation(PipelineError::NotInitialized))?;

    let request_id = Uuid::new_v4().to_string();
    info!(request_id, question, "Processing question");

    let raw = pipeline.invoke(question).await.map_err(|e| {
        error!(request_id, error = %e, "Failed to process question");
        ApiError::Invocation(e)
    })?;

    Ok(Json(ChatResponse {
        response: format_output(&raw),
        status: "success",
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let initialized = state.pipeline.is_some();

    if initialized {
        (
            StatusCode::OK,
            Json(HealthResponse {
                service: "chatbot-api",
                chatbot_initialized: true,
                status: "healthy",
                error: None,
            }),
        )
            .into_response()
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                service: "chatbot-api",
                chatbot_initialized: false,
                status: "unhealthy",
                error: Some("Chatbot pipeline not initialized"),
            }),
        )
            .into_response()
    }
}

// ─── Helpers ───────────────────────────────────────────────────────────────

/// Whether the request declares a JSON body (`application/json` or a
/// `+json` suffix type, parameters ignored).
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers.get(header::CONTENT_TYPE) else {
        return false;
    };
    let Ok(content_type) = content_type.to_str() else {
        return false;
    };
    let mime = content_type.split(';').next().unwrap_or("").trim();
    mime.eq_ignore_ascii_case("application/json") || mime.to_ascii_lowercase().ends_with("+json")
}

/// Last line of defense: convert a handler panic into the generic
/// internal-error payload for the named endpoint.
fn panic_to_response(
    endpoint: &'static str,
) -> impl Fn(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic| {
        let details = if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic.downcast_ref::<&str>() {
            (*s).to_string()
        } else {
            "unknown panic".to_string()
        };

        error!(endpoint, details, "Handler panicked");

        ApiError::Internal { endpoint, details }.into_response()
    }
}
