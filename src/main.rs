//! Nexus Search: grounded AI search in Rust
//!
//! This is the main entry point for the application.

use anyhow::Result;
use nexus_search::{
    config,
    gateway::GeminiGateway,
    metrics::Metrics,
    network::HttpClient,
    web::{create_router, AppState},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let default_level = match std::env::var("NEXUS_DEBUG").map(|v| v.parse::<bool>()) {
        Ok(Ok(true)) => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    info!("Starting Nexus Search v{}", nexus_search::VERSION);

    // Load configuration
    let settings = config::load()?;
    info!("Loaded configuration for instance: {}", settings.general.instance_name);
    // Initialize HTTP client
    let client = HttpClient::with_settings(&settings.outgoing)?;
    info!("HTTP client initialized");

    let gateway = Arc::new(GeminiGateway::new(client, settings.gemini.clone()));
    if !gateway.has_credential() {
        warn!("Missing API key: set GEMINI_API_KEY (or API_KEY). Searches will fail until it is provided.");
    }
    info!(
        "Models: fast={} deep={}",
        settings.gemini.fast_model, settings.gemini.deep_model
    );

    // Create application state
    let metrics = Arc::new(Metrics::new());
    let state = AppState::new(settings.clone(), gateway, metrics)?;
    info!("Application state initialized");

    // Create router
    let app = create_router(state);

    // Bind address
    let addr = SocketAddr::new(
        settings.server.bind_address.parse()?,
        settings.server.port,
    );

    info!("Starting server on http://{}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
