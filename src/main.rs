//! Docverify - genuineness scoring for PDF documents on IPFS
//!
//! An HTTP service (and CLI) that downloads a PDF through an IPFS gateway,
//! extracts its text and asks a Gemini model for a summary and a 0-10
//! genuineness score. A second endpoint answers questions about a fixed
//! smart-contract knowledge base.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (configuration, network, analysis failure, etc.)

mod agent;
mod cli;
mod config;
mod error;
mod ipfs;
mod knowledge;
mod llm;
mod models;
mod pdf;
mod server;
mod text;

use anyhow::{Context, Result};
use cli::{AnalyzeArgs, Args, Command, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use llm::{GeminiClient, LanguageModel};
use models::{ErrorResponse, ANALYZE_FAILURE_MESSAGE};
use server::AppContext;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let command = args.command();

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = command {
        return handle_init_config();
    }

    let mut config = Config::default();
    config.apply_env();

    init_logging(&args, config.debug);

    info!("Docverify v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let mut file_config = load_config(&args)?;
    file_config.llm.api_key = config.llm.api_key.take();
    file_config.debug = config.debug;
    file_config.merge_with_args(&args);
    let config = file_config;

    let outcome = match command {
        Command::Serve(_) => run_server(config).await,
        Command::Analyze(analyze) => run_analyze(config, analyze).await,
        Command::Chat { prompt } => run_chat(config, &prompt).await,
        Command::ListModels => run_list_models(config).await,
        Command::InitConfig => unreachable!("handled above"),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .docverify.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", config::DEFAULT_CONFIG_FILE);
    println!("   Set {} in your environment or .env file.", config::API_KEY_ENV);
    Ok(())
}

/// Initialize logging. `RUST_LOG` overrides the level chosen by flags.
fn init_logging(args: &Args, debug_mode: bool) {
    let level = args.log_level(debug_mode);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

/// Run the HTTP server.
async fn run_server(config: Config) -> Result<()> {
    info!(
        "Starting server ({} mode)",
        if config.debug { "debug" } else { "production" }
    );
    let ctx = AppContext::from_config(config).await?;
    server::serve(ctx).await
}

/// Analyze one PDF and print the same JSON the HTTP API returns.
async fn run_analyze(config: Config, args: AnalyzeArgs) -> Result<()> {
    config.require_api_key()?;
    let ipfs_hash = args.ipfs_hash.trim().to_string();

    let ctx = AppContext::from_config(config).await?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .context("Invalid progress template")?,
    );
    spinner.set_message(format!("Analyzing {}", ipfs_hash));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = ctx.analyze(&ipfs_hash).await;
    spinner.finish_and_clear();

    match outcome {
        Ok(response) => {
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
                OutputFormat::Text => {
                    println!("✅ Analysis complete for {}", response.ipfs_hash);
                    println!("   Genuineness score: {:?}/10\n", response.score);
                    println!("{}", response.summary);
                }
            }
            Ok(())
        }
        Err(e) => {
            let body = ErrorResponse::failure(e.to_string(), ANALYZE_FAILURE_MESSAGE)
                .with_ipfs_hash(&ipfs_hash);
            println!("{}", serde_json::to_string_pretty(&body)?);
            Err::<(), _>(e).context("Analysis failed")
        }
    }
}

/// Ask the knowledge-base assistant one question.
async fn run_chat(mut config: Config, prompt: &str) -> Result<()> {
    config.require_api_key()?;
    config.llm.probe_on_startup = false;

    let ctx = AppContext::from_config(config).await?;
    let reply = ctx.chat(prompt.trim()).await?;
    println!("{}", reply);
    Ok(())
}

/// Print models that support content generation.
async fn run_list_models(config: Config) -> Result<()> {
    let key = config.require_api_key()?.to_string();
    let client = GeminiClient::new(config.llm.api_url, Some(key), config.llm.timeout_seconds)?;

    let models = client.list_models().await?;
    println!("Available Gemini models:");
    for name in models {
        println!("- {}", name);
    }
    Ok(())
}
