//! Gemini REST client.
//!
//! Talks to the `generateContent` and `models` endpoints of the Generative
//! Language API. The key travels in the `x-goog-api-key` header so it never
//! shows up in URLs or error messages.

use super::{LanguageModel, LlmError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// `generateContent` request body.
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

/// `models` listing response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Client for the Gemini API.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    timeout_seconds: u64,
}

impl GeminiClient {
    /// Create a client. A missing key is only reported when a call is made.
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key,
            timeout_seconds,
        })
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| LlmError::Config("GEMINI_API_KEY not set".into()))
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/{}:generateContent", self.api_url, model_path(model))
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Network(format!("Request timed out after {}s", self.timeout_seconds))
        } else if e.is_connect() {
            LlmError::Network(format!("Cannot connect to Gemini API at {}", self.api_url))
        } else {
            LlmError::Network(format!("Failed to send request: {}", e.without_url()))
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(LlmError::Api(format!("Gemini API error {}: {}", status, body)))
    }
}

/// Resource path for a model name; `models/` is added unless already present.
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{}", model)
    }
}

/// Concatenated text of the first candidate, if any.
fn first_candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let key = self.api_key()?;
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!("Sending generateContent to {} ({} chars)", model, prompt.len());

        let response = self
            .http_client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = Self::check_status(response).await?;

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse Gemini response: {}", e)))?;

        first_candidate_text(body).ok_or_else(|| LlmError::EmptyResponse(model.to_string()))
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let key = self.api_key()?;

        let response = self
            .http_client
            .get(format!("{}/models", self.api_url))
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = Self::check_status(response).await?;

        let body: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(format!("Failed to parse model list: {}", e)))?;

        Ok(body
            .models
            .into_iter()
            .filter(|m| {
                m.supported_generation_methods
                    .iter()
                    .any(|method| method == "generateContent")
            })
            .map(|m| m.name)
            .collect())
    }
}
