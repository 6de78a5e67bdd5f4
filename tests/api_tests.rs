//! End-to-end tests of the HTTP API, driving the router with a fake model
//! backend.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use chatbot_api::pipeline::model::{ModelClient, ModelError};
use chatbot_api::pipeline::prompt::PromptTemplate;
use chatbot_api::pipeline::ChatPipeline;
use chatbot_api::server::routes::{build_router, AppState};

struct CannedClient(Value);

#[async_trait]
impl ModelClient for CannedClient {
    async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
        Ok(self.0.clone())
    }
}

struct FailingClient;

#[async_trait]
impl ModelClient for FailingClient {
    async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
        Err(ModelError::Backend {
            status: 500,
            message: "model exploded".to_string(),
        })
    }
}

struct PanickingClient;

#[async_trait]
impl ModelClient for PanickingClient {
    async fn generate(&self, _prompt: &str) -> Result<Value, ModelError> {
        panic!("backend went sideways");
    }
}

fn app_with_client(client: Box<dyn ModelClient>) -> Router {
    let pipeline = ChatPipeline::new(PromptTemplate::new("You are my personal assistant"), client);
    app_with_pipeline(Some(pipeline))
}

fn app_with_pipeline(pipeline: Option<ChatPipeline>) -> Router {
    let state = Arc::new(AppState {
        pipeline: pipeline.map(Arc::new),
    });
    build_router(state)
}

async fn post_chat(app: Router, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut request = Request::builder().method("POST").uri("/api/chat");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let response = app
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();
    into_json(response).await
}

async fn get_health(app: Router) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    into_json(response).await
}

async fn into_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_non_json_content_type_is_415() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, body) = post_chat(app, Some("text/plain"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Content-Type must be application/json");
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_missing_content_type_is_415() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, _) = post_chat(app, None, r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn test_empty_body_is_400() {
    for body in ["", "null", "{}", "not json", "[1,2]"] {
        let app = app_with_client(Box::new(CannedClient(json!("hi"))));
        let (status, json) = post_chat(app, Some("application/json"), body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
        assert_eq!(json["error"], "Empty request body");
        assert_eq!(json["status"], "error");
    }
}

#[tokio::test]
async fn test_missing_question_is_400() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"query":"hi"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing 'question' in request body");
}

#[tokio::test]
async fn test_non_string_question_is_400() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":42}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "'question' must be a string");
}

#[tokio::test]
async fn test_whitespace_question_is_400() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"   "}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Question cannot be empty");
}

#[tokio::test]
async fn test_valid_question_is_200_success() {
    let app = app_with_client(Box::new(CannedClient(json!("Hello!"))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"Say hello"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["response"], "Hello!");
}

#[tokio::test]
async fn test_question_is_trimmed_before_invocation() {
    let app = app_with_client(Box::new(CannedClient(json!("ok"))));
    let (status, _) = post_chat(
        app,
        Some("application/json; charset=utf-8"),
        r#"{"question":"  Say hello  "}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bold_markers_formatted_in_response() {
    let app = app_with_client(Box::new(CannedClient(json!("a **b** c"))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "a <strong>b</strong> c");
}

#[tokio::test]
async fn test_non_string_model_output_still_succeeds() {
    let app = app_with_client(Box::new(CannedClient(json!({"unexpected": true}))));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], r#"{"unexpected":true}"#);
}

#[tokio::test]
async fn test_model_failure_is_500_with_details() {
    let app = app_with_client(Box::new(FailingClient));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process question");
    assert_eq!(body["status"], "error");
    assert!(body["details"].as_str().unwrap().contains("model exploded"));
}

#[tokio::test]
async fn test_uninitialized_pipeline_chat_is_500() {
    let app = app_with_pipeline(None);
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["details"], "Chatbot pipeline not initialized");
}

#[tokio::test]
async fn test_panicking_handler_is_caught_as_500() {
    let app = app_with_client(Box::new(PanickingClient));
    let (status, body) = post_chat(app, Some("application/json"), r#"{"question":"hi"}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Internal server error");
    assert_eq!(body["endpoint"], "chat");
    assert!(body["details"].as_str().unwrap().contains("sideways"));
}

#[tokio::test]
async fn test_health_healthy_when_pipeline_present() {
    let app = app_with_client(Box::new(CannedClient(json!("hi"))));
    let (status, body) = get_health(app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "chatbot-api");
    assert_eq!(body["chatbot_initialized"], true);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn test_health_unhealthy_without_pipeline() {
    let app = app_with_pipeline(None);
    let (status, body) = get_health(app).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["chatbot_initialized"], false);
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["error"], "Chatbot pipeline not initialized");
}
