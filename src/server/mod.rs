//! HTTP server for the chatbot API.
//!
//! - [`routes`]: Application state, router, and route handlers
//! - [`error`]: API error taxonomy and HTTP translation

pub mod error;
pub mod routes;
