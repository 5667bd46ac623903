mod analysis;
mod config;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::Analyzer;
use crate::config::Config;
use crate::llm_client::{AnalysisClient, GeminiClient};
use crate::routes::build_router;
use crate::session::store::{spawn_reaper, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume ATS v{}", env!("CARGO_PKG_VERSION"));

    if !config.has_api_key() {
        warn!("GEMINI_API_KEY is not set; analysis requests will fail until it is configured");
    }

    // Initialize LLM client
    let client = GeminiClient::new(
        config.gemini_api_key.clone(),
        config.gemini_model.clone(),
        config.gemini_api_base.clone(),
    )?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s)",
        client.model(),
        config.llm_timeout.as_secs()
    );
    let analyzer = Analyzer::new(Arc::new(client), config.llm_timeout);

    // Sessions are in-memory; the reaper bounds their number
    let sessions = SessionStore::new();
    spawn_reaper(sessions.clone(), config.session_ttl);
    info!(
        "Session store initialized (idle ttl: {}s)",
        config.session_ttl.as_secs()
    );

    let state = AppState {
        sessions,
        analyzer,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
