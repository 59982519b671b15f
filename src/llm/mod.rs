//! Language model access.
//!
//! `LanguageModel` is the seam between the pipeline and the hosted model;
//! `GeminiClient` is the production implementation. `ModelCandidates`
//! walks an ordered list of model names until one answers.

pub mod gemini;

#[cfg(test)]
pub mod mock;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Model client errors.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response, unknown model, quota)
    #[error("API error: {0}")]
    Api(String),

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The model returned no text.
    #[error("Model {0} returned an empty response")]
    EmptyResponse(String),
}

/// A hosted text generation model.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` to `model` and return the generated text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;

    /// Names of models that support text generation.
    async fn list_models(&self) -> Result<Vec<String>>;
}

/// Ordered model names; the first one that answers wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates {
    names: Vec<String>,
}

impl ModelCandidates {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn first(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    /// Try each candidate in order with `prompt`.
    ///
    /// Returns the winning model name and its reply, or `None` when every
    /// candidate failed (or the list is empty).
    pub async fn generate(
        &self,
        llm: &dyn LanguageModel,
        prompt: &str,
    ) -> Option<(String, String)> {
        for name in &self.names {
            debug!("Trying model {}", name);
            match llm.generate(name, prompt).await {
                Ok(text) => return Some((name.clone(), text)),
                Err(e) => warn!("Model {} failed: {}", name, e),
            }
        }
        None
    }

    /// Find the first candidate that answers a trivial prompt.
    pub async fn probe(&self, llm: &dyn LanguageModel) -> Option<String> {
        let (name, _) = self.generate(llm, "Hello").await?;
        info!("Successfully using model: {}", name);
        Some(name)
    }
}
