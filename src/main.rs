// =============================================================================
// Bullion Lens — Main Entry Point
// =============================================================================
//
// Serves precious-metals indicators, trend, events, levels and a short linear
// forecast to the dashboard. Analysis runs lazily: the first request after
// the snapshot expires rebuilds it.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod error;
mod indicators;
mod market_data;
mod provider;
mod runtime_config;
mod types;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::market_data::SeriesStore;
use crate::provider::YahooClient;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "bullion_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Bullion Lens — starting up");

    let config_path =
        std::env::var("BULLION_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    if let Ok(addr) = std::env::var("BULLION_BIND_ADDR") {
        config.bind_addr = addr;
    }

    info!(
        instrument_a = %config.instrument_a.symbol,
        instrument_b = %config.instrument_b.symbol,
        cache = %config.cache_path.display(),
        "Configured instruments"
    );

    // ── 2. Provider, store and shared state ──────────────────────────────
    let client = YahooClient::new(
        config.provider_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let store = SeriesStore::new(Arc::new(client), &config);
    let state = Arc::new(AppState::new(store, &config));

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "API server listening");

    // ── 4. Graceful shutdown ─────────────────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Bullion Lens shut down complete.");
    Ok(())
}
