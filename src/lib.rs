//! chatbot-api: question-answering HTTP service backed by a local model runtime.
//!
//! A single pipeline (prompt template → model client → output parsing) is
//! built and smoke-tested once at startup, then shared read-only by the
//! HTTP handlers:
//!   POST /api/chat   — answer a question
//!   GET  /api/health — report pipeline status
//!
//! The model backend is Ollama's generate API; the service itself keeps no
//! state beyond the immutable pipeline handle.

pub mod config;
pub mod format;
pub mod pipeline;
pub mod server;
