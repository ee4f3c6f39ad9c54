// =============================================================================
// ProTrade API — Main Entry Point
// =============================================================================
//
// Serves market data and break-of-structure trade tickets for the web
// dashboard.  Market data comes from Schwab using a token file produced by
// the separate login helper; the server never runs the OAuth flow itself.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod indicators;
mod market_data;
mod runtime_config;
mod schwab;
mod strategy;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("ProTrade API starting up");

    let config_path =
        std::env::var("PROTRADE_CONFIG").unwrap_or_else(|_| "runtime_config.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });
    config.apply_env(|key| std::env::var(key).ok());

    info!(
        bind_addr = %config.bind_addr,
        origins = ?config.allowed_origins,
        token_path = %config.schwab.token_path.display(),
        atr_period = config.strategy_params.atr_period,
        spread_width = config.strategy_params.spread_width,
        "Configuration resolved"
    );

    // ── 2. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);

    match state.schwab_client() {
        Ok(Some(_)) => info!("Schwab credentials found"),
        Ok(None) => warn!("Schwab credentials missing — market endpoints will return 401"),
        Err(e) => warn!(error = %e, "Schwab token file unreadable"),
    }

    // ── 3. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("ProTrade API shut down complete.");
    Ok(())
}
