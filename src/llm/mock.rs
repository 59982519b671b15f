//! Scripted in-memory model for tests.

use super::{LanguageModel, LlmError, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// Answers every prompt with a fixed reply and records which models were called.
pub struct ScriptedModel {
    default_reply: String,
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(default_reply: &str) -> Self {
        Self {
            default_reply: default_reply.to_string(),
            failing: HashSet::new(),
            calls: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Make the named models fail with an API error.
    pub fn failing(mut self, models: &[&str]) -> Self {
        self.failing.extend(models.iter().map(|m| m.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        self.calls.lock().unwrap().push(model.to_string());
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.failing.contains(model) {
            return Err(LlmError::Api(format!("404 Not Found: model {}", model)));
        }

        Ok(self.default_reply.clone())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        Ok(vec!["models/scripted".to_string()])
    }
}
