//! Data models for document analysis.
//!
//! Task descriptors, result records and the JSON payloads returned by the
//! HTTP API and the `analyze` command.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Generic user-facing message attached to failed analyses.
pub const ANALYZE_FAILURE_MESSAGE: &str =
    "Failed to analyze PDF. Please check the IPFS hash and try again.";

/// One request to download, summarize and score a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScorePdfTask {
    pub name: &'static str,
    pub description: &'static str,
    pub ipfs_hash: String,
}

impl ScorePdfTask {
    pub fn new(ipfs_hash: impl Into<String>) -> Self {
        Self {
            name: "ScorePdfTask",
            description: "Download, summarize, and score PDF",
            ipfs_hash: ipfs_hash.into(),
        }
    }
}

/// Outcome of a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Model-written summary, trimmed.
    pub summary: String,
    /// Genuineness score in `[0, 10]`.
    pub score: f64,
}

/// Successful `/analyze` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub status: String,
    pub ipfs_hash: String,
    pub summary: String,
    pub score: f64,
    pub timestamp: String,
    pub message: String,
}

impl AnalyzeResponse {
    /// Build the success payload; `summary` should already be cleaned.
    pub fn success(ipfs_hash: &str, summary: String, score: f64) -> Self {
        Self {
            status: "success".to_string(),
            ipfs_hash: ipfs_hash.to_string(),
            summary,
            score,
            timestamp: timestamp(),
            // `{:?}` prints the score unrounded but keeps a trailing `.0`: 8.0, 7.25.
            message: format!(
                "PDF analysis completed successfully. Genuineness score: {:?}/10",
                score
            ),
        }
    }
}

/// Successful `/api/chat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub status: String,
    pub timestamp: String,
}

impl ChatResponse {
    pub fn success(reply: String) -> Self {
        Self {
            reply,
            status: "success".to_string(),
            timestamp: timestamp(),
        }
    }
}

/// `/health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: "PDF Verification Agent is running".to_string(),
            timestamp: timestamp(),
        }
    }
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipfs_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorResponse {
    /// Error without a user-facing message (configuration and validation).
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: error.into(),
            ipfs_hash: None,
            message: None,
            timestamp: None,
        }
    }

    /// Processing failure with a generic message and timestamp.
    pub fn failure(error: impl Into<String>, message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            timestamp: Some(timestamp()),
            ..Self::new(error)
        }
    }

    pub fn with_ipfs_hash(mut self, ipfs_hash: &str) -> Self {
        self.ipfs_hash = Some(ipfs_hash.to_string());
        self
    }
}

/// Current time as an RFC 3339 string.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339()
}
