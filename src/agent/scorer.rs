//! The PDF scoring agent.
//!
//! Runs the analysis pipeline for one task: download, extract, summarize,
//! score. Every step is awaited in order and the first failure aborts the
//! task.

use super::prompts::{parse_score, score_prompt, summary_prompt};
use crate::error::Result;
use crate::ipfs::Fetcher;
use crate::llm::LanguageModel;
use crate::models::{AnalysisResult, ScorePdfTask};
use crate::text::truncate_chars;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Agent that downloads, summarizes and scores a PDF from IPFS.
pub struct PdfScorerAgent<'a> {
    fetcher: &'a Fetcher,
    llm: &'a dyn LanguageModel,
    model: &'a str,
    max_chars: usize,
}

impl<'a> PdfScorerAgent<'a> {
    pub fn new(
        fetcher: &'a Fetcher,
        llm: &'a dyn LanguageModel,
        model: &'a str,
        max_chars: usize,
    ) -> Self {
        Self {
            fetcher,
            llm,
            model,
            max_chars,
        }
    }

    /// Run every step of `task` and combine the results.
    pub async fn run(&self, task: &ScorePdfTask) -> Result<AnalysisResult> {
        info!("Running {} for {}", task.name, task.ipfs_hash);
        debug!("{}", task.description);

        let path = self.download_pdf(&task.ipfs_hash).await?;
        let text = self.extract_text(&path).await?;
        let summary = self.summarize(&text).await?;
        let score = self.score(&text).await?;

        info!("{} finished: score {:.1}/10", task.name, score);
        Ok(AnalysisResult { summary, score })
    }

    /// Download the PDF and return its local path.
    pub async fn download_pdf(&self, ipfs_hash: &str) -> Result<PathBuf> {
        self.fetcher.fetch(ipfs_hash).await
    }

    /// Extract the text of a downloaded PDF.
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        crate::pdf::extract_text(path).await
    }

    /// Summarize the first `max_chars` characters of `text`.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = summary_prompt(truncate_chars(text, self.max_chars));
        debug!("Requesting summary from {}", self.model);
        let response = self.llm.generate(self.model, &prompt).await?;
        Ok(response.trim().to_string())
    }

    /// Genuineness score for the first `max_chars` characters of `text`.
    ///
    /// An unparseable answer yields the fallback score; a failed call is an error.
    pub async fn score(&self, text: &str) -> Result<f64> {
        let prompt = score_prompt(truncate_chars(text, self.max_chars));
        debug!("Requesting score from {}", self.model);
        let response = self.llm.generate(self.model, &prompt).await?;
        Ok(parse_score(&response))
    }
}
