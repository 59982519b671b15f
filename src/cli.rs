//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Docverify - genuineness scoring for PDF documents on IPFS
///
/// Fetches a PDF through an IPFS gateway, extracts its text and asks a
/// Gemini model for a summary and a 0-10 genuineness score. Also answers
/// questions about the smart-contract knowledge base.
///
/// Examples:
///   docverify serve --bind 127.0.0.1:5000
///   docverify analyze QmYA2fn8cMbVWo4v95RwcwJVyQsNtnEwHerfWR8UNtEwoE
///   docverify chat "How do I create a fundraiser?"
///   docverify list-models
///   docverify init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .docverify.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// IPFS gateway base URL
    #[arg(long, value_name = "URL", env = "IPFS_GATEWAY_URL", global = true)]
    pub gateway_url: Option<String>,

    /// Directory downloaded PDFs are written to
    #[arg(long, value_name = "DIR", global = true)]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands. `serve` runs when none is given.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),

    /// Analyze a single PDF by IPFS hash and print the JSON result
    Analyze(AnalyzeArgs),

    /// Ask the smart-contract assistant one question
    Chat {
        /// The question to ask
        prompt: String,
    },

    /// List Gemini models that support content generation
    ListModels,

    /// Generate a default .docverify.toml configuration file
    InitConfig,
}

/// Options for `serve`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Socket address to listen on
    #[arg(long, value_name = "ADDR", env = "DOCVERIFY_BIND")]
    pub bind: Option<String>,

    /// Knowledge base JSON used by the chat endpoint
    #[arg(long, value_name = "FILE")]
    pub knowledge_base: Option<PathBuf>,

    /// Skip probing the analysis models at startup
    #[arg(long)]
    pub no_probe: bool,
}

/// Options for `analyze`.
#[derive(clap::Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// IPFS content hash of the PDF
    pub ipfs_hash: String,

    /// Output format (json, text)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,
}

/// Output format for `analyze`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// Human-readable text
    Text,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref gateway_url) = self.gateway_url {
            if !gateway_url.starts_with("http://") && !gateway_url.starts_with("https://") {
                return Err("Gateway URL must start with 'http://' or 'https://'".to_string());
            }
        }

        match self.command {
            Some(Command::Serve(ref serve)) => {
                if let Some(ref bind) = serve.bind {
                    if bind.parse::<std::net::SocketAddr>().is_err() {
                        return Err(format!("Invalid bind address: {}", bind));
                    }
                }
            }
            Some(Command::Analyze(ref analyze)) => {
                if analyze.ipfs_hash.trim().is_empty() {
                    return Err("IPFS hash cannot be empty".to_string());
                }
            }
            Some(Command::Chat { ref prompt }) => {
                if prompt.trim().is_empty() {
                    return Err("Prompt cannot be empty".to_string());
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// Debug mode raises the default from INFO to DEBUG; explicit flags win.
    pub fn log_level(&self, debug_mode: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || debug_mode {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// The subcommand to run, defaulting to `serve`.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    }
}
