//! Runtime configuration for chatbot-api.
//!
//! Configuration can be loaded from a JSON file or constructed
//! programmatically. Model-backend and retry knobs live here.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::pipeline::init::{Backoff, RetryPolicy};

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "chatbot-api", about = "Question-answering HTTP API over a local Ollama model")]
pub struct Cli {
    /// Path to configuration file (JSON).
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// HTTP listen address (overrides the config file).
    #[arg(long)]
    pub listen: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Model backend configuration.
    pub model: ModelConfig,

    /// Startup retry policy.
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            model: ModelConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g. "0.0.0.0:5000").
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
        }
    }
}

/// Model-backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Base URL of the Ollama server.
    pub base_url: String,

    /// Model name to request (e.g. "llama3").
    pub model: String,

    /// System prompt prepended to every question.
    pub system_prompt: String,

    /// Sampling temperature.
    pub temperature: f64,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3".to_string(),
            system_prompt: "You are my personal assistant".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl ModelConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Startup retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum initialization attempts before giving up.
    pub max_attempts: u32,

    /// Delay between attempts in seconds.
    pub delay_secs: u64,

    /// Backoff multiplier applied per attempt (1.0 = fixed delay).
    pub backoff_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 2,
            backoff_factor: 1.0,
        }
    }
}

impl RetryConfig {
    /// Build the retry policy this configuration describes.
    pub fn policy(&self) -> RetryPolicy {
        let backoff = if self.backoff_factor > 1.0 {
            Backoff::Exponential {
                factor: self.backoff_factor,
            }
        } else {
            Backoff::Fixed
        };
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_secs(self.delay_secs),
            backoff,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when the file is absent.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }
}
