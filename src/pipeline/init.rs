//! Smoke-tested pipeline initialization with a bounded retry policy.
//!
//! The service must not accept traffic without a verified-working pipeline:
//! each attempt builds the pipeline and runs one canned invocation through
//! it. When every attempt fails the error propagates to `main` and the
//! process exits non-zero. No degraded mode exists.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use super::{ChatPipeline, PipelineError};

/// Canned input for the startup smoke test.
pub const SMOKE_TEST_QUESTION: &str = "Say hello";

/// Delay growth strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay after every failed attempt.
    Fixed,
    /// Delay multiplied by `factor` after each failed attempt.
    Exponential { factor: f64 },
}

/// Bounded startup retry policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after the given 1-based failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential { factor } => {
                self.delay.mul_f64(factor.powi(attempt.saturating_sub(1) as i32))
            }
        }
    }
}

/// Initialization failure after all attempts were exhausted.
#[derive(Error, Debug)]
pub enum InitError {
    #[error("chatbot initialization failed after {attempts} attempts")]
    Exhausted {
        attempts: u32,
        #[source]
        source: PipelineError,
    },
}

/// Build and smoke-test a pipeline, retrying per `policy`.
///
/// The builder is injected so tests can substitute fake constructors; the
/// production caller passes a closure around [`super::build_pipeline`].
pub async fn initialize_with_retry<F, Fut>(
    policy: &RetryPolicy,
    mut build: F,
) -> Result<ChatPipeline, InitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ChatPipeline, PipelineError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        info!(attempt, max_attempts, "Initializing chatbot pipeline");

        match attempt_init(&mut build).await {
            Ok(pipeline) => return Ok(pipeline),
            Err(e) => {
                if attempt < max_attempts {
                    warn!(attempt, error = %e, "Initialization attempt failed, retrying...");
                } else {
                    warn!(attempt, error = %e, "Initialization attempt failed");
                }
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    error!("Failed to initialize chatbot after multiple attempts");
    Err(InitError::Exhausted {
        attempts: max_attempts,
        source: last_error.unwrap_or(PipelineError::NotInitialized),
    })
}

async fn attempt_init<F, Fut>(build: &mut F) -> Result<ChatPipeline, PipelineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<ChatPipeline, PipelineError>>,
{
    let pipeline = build().await?;
    let reply = pipeline.invoke(SMOKE_TEST_QUESTION).await?;
    info!(response = %reply, "Chatbot test response");
    Ok(pipeline)
}
