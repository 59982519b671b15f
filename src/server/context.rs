//! Process-wide application context.
//!
//! Built once at startup and shared read-only by every request. Holds the
//! configuration, the model handle, the gateway fetcher and the rendered
//! knowledge-base context.

use crate::agent::prompts::chat_prompt;
use crate::agent::PdfScorerAgent;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::ipfs::{validate_hash, Fetcher};
use crate::knowledge::KnowledgeBase;
use crate::llm::{GeminiClient, LanguageModel, ModelCandidates};
use crate::models::{AnalyzeResponse, ScorePdfTask};
use crate::text::clean_text_formatting;
use anyhow::Context as _;
use std::sync::Arc;
use tracing::{info, warn};

/// Model used for analysis when the candidate list is empty.
const DEFAULT_ANALYSIS_MODEL: &str = "gemini-1.5-flash";

/// Shared state behind every handler.
pub struct AppContext {
    pub config: Config,
    pub llm: Arc<dyn LanguageModel>,
    pub fetcher: Fetcher,
    pub analysis_model: String,
    pub chat_models: ModelCandidates,
    pub knowledge_context: String,
}

impl AppContext {
    /// Assemble a context from already-built parts.
    ///
    /// The analysis model is the first configured candidate; `from_config`
    /// replaces it with the probed one.
    pub fn new(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        knowledge: &KnowledgeBase,
    ) -> Result<Self> {
        let fetcher = Fetcher::new(&config.ipfs)?;
        let analysis_model = ModelCandidates::new(config.llm.analysis_models.clone())
            .first()
            .unwrap_or(DEFAULT_ANALYSIS_MODEL)
            .to_string();
        let chat_models = ModelCandidates::new(config.llm.chat_models.clone());

        Ok(Self {
            config,
            llm,
            fetcher,
            analysis_model,
            chat_models,
            knowledge_context: knowledge.format_context(),
        })
    }

    /// Build the production context: Gemini client, knowledge base, model probe.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = GeminiClient::new(
            config.llm.api_url.clone(),
            config.llm.api_key.clone(),
            config.llm.timeout_seconds,
        )
        .context("Failed to create Gemini client")?;

        let knowledge = KnowledgeBase::load_or_empty(&config.server.knowledge_base);
        let probe = config.llm.api_key.is_some() && config.llm.probe_on_startup;

        let mut ctx =
            Self::new(config, Arc::new(client), &knowledge).context("Failed to build context")?;

        if probe {
            let candidates = ModelCandidates::new(ctx.config.llm.analysis_models.clone());
            match candidates.probe(ctx.llm.as_ref()).await {
                Some(model) => ctx.analysis_model = model,
                None => warn!(
                    "No working Gemini model found; falling back to {}",
                    ctx.analysis_model
                ),
            }
        } else {
            info!("Skipping model probe; using {}", ctx.analysis_model);
        }

        Ok(ctx)
    }

    /// Agent bound to this context's collaborators.
    pub fn agent(&self) -> PdfScorerAgent<'_> {
        PdfScorerAgent::new(
            &self.fetcher,
            self.llm.as_ref(),
            &self.analysis_model,
            self.config.analysis.max_chars,
        )
    }

    /// Analyze one PDF and build the cleaned response payload.
    pub async fn analyze(&self, ipfs_hash: &str) -> Result<AnalyzeResponse> {
        self.config.require_api_key()?;
        validate_hash(ipfs_hash)?;

        let result = self.agent().run(&ScorePdfTask::new(ipfs_hash)).await?;
        let summary = clean_text_formatting(&result.summary);
        Ok(AnalyzeResponse::success(ipfs_hash, summary, result.score))
    }

    /// Answer a question about the knowledge base; the reply is cleaned.
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        self.config.require_api_key()?;

        let full_prompt = chat_prompt(&self.knowledge_context, prompt);
        let (model, reply) = self
            .chat_models
            .generate(self.llm.as_ref(), &full_prompt)
            .await
            .ok_or(AppError::NoWorkingModel)?;

        info!("Chat answered by {}", model);
        Ok(clean_text_formatting(reply.trim()))
    }
}
