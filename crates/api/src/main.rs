mod config;
mod metrics;
mod routes;
mod store;

use anyhow::{Context, Result};
use session::Assistant;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use metrics::{MeteredCompletion, Metrics};
use routes::AppState;
use store::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        provider = config.llm.provider_name(),
        model = config.llm.model(),
        base_url = config.llm.base_url(),
        max_tokens = config.limits.max_tokens,
        max_chars = config.limits.max_chars,
        "Loaded configuration"
    );

    let metrics = Metrics::new();
    let llm = Arc::new(MeteredCompletion::new(config.completion_service()?, metrics.clone()));

    let state = AppState {
        store: SessionStore::new(),
        assistant: Arc::new(Assistant::new(llm, config.limits)),
        metrics,
        provider: config.llm.provider_name(),
        model: config.llm.model().to_string(),
    };

    let app = routes::router(state, config.server.max_upload_bytes);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;

    tracing::info!("Server listening on http://{}", config.server.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
