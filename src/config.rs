//! Configuration file handling.
//!
//! Settings come from three places, lowest precedence first: built-in
//! defaults, a `.docverify.toml` file, and CLI flags. Secrets and the
//! deployment mode are read from the environment only.

use crate::error::AppError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".docverify.toml";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable selecting the deployment mode.
pub const APP_ENV: &str = "APP_ENV";

/// Value shipped in `.env.example`; treated the same as an absent key.
const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// IPFS gateway settings.
    #[serde(default)]
    pub ipfs: IpfsConfig,

    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Document analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Debug mode, derived from `APP_ENV`. Never read from the file.
    #[serde(skip)]
    pub debug: bool,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path of the smart-contract knowledge base used by the chat endpoint.
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            knowledge_base: default_knowledge_base(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_knowledge_base() -> PathBuf {
    PathBuf::from("knowledge_base/contracts.json")
}

/// IPFS gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpfsConfig {
    /// Gateway base URL; the content hash is appended as a path segment.
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// Fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout")]
    pub timeout_seconds: u64,

    /// Directory downloaded PDFs are written to.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            timeout_seconds: default_fetch_timeout(),
            download_dir: default_download_dir(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://ipfs.io/ipfs".to_string()
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Gemini REST base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Candidates probed at startup; the first that answers handles analysis.
    #[serde(default = "default_analysis_models")]
    pub analysis_models: Vec<String>,

    /// Candidates tried in order for every chat request.
    #[serde(default = "default_chat_models")]
    pub chat_models: Vec<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Probe `analysis_models` when the server starts.
    #[serde(default = "default_true")]
    pub probe_on_startup: bool,

    /// API key from the environment. Never serialized.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            analysis_models: default_analysis_models(),
            chat_models: default_chat_models(),
            timeout_seconds: default_llm_timeout(),
            probe_on_startup: true,
            api_key: None,
        }
    }
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_analysis_models() -> Vec<String> {
    vec![
        "gemini-1.5-flash",
        "gemini-1.5-pro",
        "gemini-pro",
        "models/gemini-1.5-flash",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_chat_models() -> Vec<String> {
    vec!["gemini-1.5-flash", "gemini-1.5-pro", "gemini-1.0-pro"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_llm_timeout() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

/// Document analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Characters of extracted text sent to the model; the rest is dropped.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    8000
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Fill in the API key and debug flag from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Fill in environment-derived settings using the given lookup.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.llm.api_key = lookup(API_KEY_ENV)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty() && key != API_KEY_PLACEHOLDER);

        self.debug = lookup(APP_ENV).as_deref() != Some("production");
    }

    /// The configured API key, or a configuration error.
    pub fn require_api_key(&self) -> std::result::Result<&str, AppError> {
        self.llm.api_key.as_deref().ok_or(AppError::MissingApiKey)
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref gateway_url) = args.gateway_url {
            self.ipfs.gateway_url = gateway_url.clone();
        }
        if let Some(ref download_dir) = args.download_dir {
            self.ipfs.download_dir = download_dir.clone();
        }

        if let Some(crate::cli::Command::Serve(ref serve)) = args.command {
            if let Some(ref bind) = serve.bind {
                self.server.bind = bind.clone();
            }
            if let Some(ref knowledge_base) = serve.knowledge_base {
                self.server.knowledge_base = knowledge_base.clone();
            }
            if serve.no_probe {
                self.llm.probe_on_startup = false;
            }
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
