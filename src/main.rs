//! chatbot-api: question-answering HTTP service over a local Ollama model.
//!
//! Boot sequence: parse CLI → init tracing → load config → build and
//! smoke-test the pipeline (bounded retries, fail-fast) → serve
//! /api/chat and /api/health.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use chatbot_api::config::{Cli, Config};
use chatbot_api::pipeline::build_pipeline;
use chatbot_api::pipeline::init::initialize_with_retry;
use chatbot_api::server::routes::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "chatbot_api=debug,tower_http=debug"
    } else {
        "chatbot_api=info,tower_http=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_target(true)
        .init();

    info!("chatbot-api v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let config = Config::load(&cli.config)?;

    info!(
        model = config.model.model,
        base_url = config.model.base_url,
        timeout_secs = config.model.timeout_secs,
        "Configuration loaded"
    );

    // Build and smoke-test the pipeline. The service must not accept
    // traffic without a verified-working pipeline.
    let policy = config.retry.policy();
    let model_config = config.model.clone();
    let pipeline = initialize_with_retry(&policy, move || {
        let model_config = model_config.clone();
        async move { build_pipeline(&model_config) }
    })
    .await
    .context("failed to initialize chatbot")?;

    // Build application state. The pipeline handle is immutable from here.
    let state = Arc::new(AppState {
        pipeline: Some(Arc::new(pipeline)),
    });

    // Build the HTTP router.
    let app = build_router(state);

    // Start the server.
    let listen_addr = cli
        .listen
        .unwrap_or_else(|| config.server.listen.clone());
    info!(addr = listen_addr, "Starting server");

    let listener = TcpListener::bind(&listen_addr).await?;
    info!("Listening on {listen_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
