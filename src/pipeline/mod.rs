//! The chatbot pipeline: prompt template → model client → raw output.
//!
//! - [`prompt`]: renders the system/user messages into a prompt string
//! - [`model`]: the backend client seam and the Ollama implementation
//! - [`init`]: startup retry policy and smoke-tested initialization
//!
//! A [`ChatPipeline`] is built once at startup and never rebuilt; handlers
//! share it behind an `Arc`.

pub mod init;
pub mod model;
pub mod prompt;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::config::ModelConfig;
use model::{ModelClient, ModelError, OllamaClient};
use prompt::PromptTemplate;

/// Errors from invoking the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Chatbot pipeline not initialized")]
    NotInitialized,

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// The composed question-answering pipeline.
pub struct ChatPipeline {
    template: PromptTemplate,
    client: Box<dyn ModelClient>,
}

impl ChatPipeline {
    pub fn new(template: PromptTemplate, client: Box<dyn ModelClient>) -> Self {
        Self { template, client }
    }

    /// Answer one question: render the prompt, call the model, and return
    /// the backend's raw generated output.
    pub async fn invoke(&self, question: &str) -> Result<Value, PipelineError> {
        let prompt = self.template.render(question);
        let output = self.client.generate(&prompt).await?;
        debug!(question, "Pipeline invocation complete");
        Ok(output)
    }
}

/// Build the production pipeline against a local Ollama server.
pub fn build_pipeline(config: &ModelConfig) -> Result<ChatPipeline, PipelineError> {
    let client = OllamaClient::new(config)?;
    let template = PromptTemplate::new(&config.system_prompt);
    Ok(ChatPipeline::new(template, Box::new(client)))
}
