//! HTTP API.
//!
//! Routes:
//! - `GET /`          web interface
//! - `POST /analyze`  score a PDF by IPFS hash
//! - `POST /api/chat` smart-contract assistant
//! - `GET /health`    liveness

pub mod context;
mod handlers;

pub use context::AppContext;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared handler state.
pub type AppState = Arc<AppContext>;

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/analyze", post(handlers::analyze))
        .route("/api/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(ctx: AppContext) -> Result<()> {
    let bind = ctx.config.server.bind.clone();
    if ctx.config.require_api_key().is_err() {
        tracing::warn!("GEMINI_API_KEY is not set; /analyze and /api/chat will fail");
    }

    let app = router(Arc::new(ctx));
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    info!("Listening on http://{}", bind);
    info!("  Web interface:  GET  /");
    info!("  PDF analysis:   POST /analyze   {{\"ipfs_hash\": \"Qm...\"}}");
    info!("  Web3 chatbot:   POST /api/chat  {{\"prompt\": \"...\"}}");
    info!("  Health check:   GET  /health");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
