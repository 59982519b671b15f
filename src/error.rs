//! Error types shared by the analysis pipeline and the HTTP layer.

use crate::llm::LlmError;
use axum::http::StatusCode;
use thiserror::Error;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Everything that can abort an analysis or chat request.
#[derive(Debug, Error)]
pub enum AppError {
    /// The API key is absent or still the placeholder value.
    #[error("GEMINI_API_KEY not configured. Please set it in your environment or .env file.")]
    MissingApiKey,

    /// A required request field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// Gateway retrieval failed (network error or non-2xx status).
    #[error("Failed to download PDF from IPFS: {0}")]
    Fetch(String),

    /// The downloaded file could not be read as a PDF.
    #[error("Failed to extract text from PDF: {0}")]
    Extract(String),

    /// A model call failed.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Every chat model candidate failed.
    #[error("Failed to generate response. No working model available.")]
    NoWorkingModel,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::MissingApiKey.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Fetch("refused".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_fetch_message_includes_cause() {
        let err = AppError::Fetch("connection refused".into());
        assert_eq!(
            err.to_string(),
            "Failed to download PDF from IPFS: connection refused"
        );
    }
}
