// =============================================================================
// Stock Tracker - Main Entry Point
// =============================================================================
//
// Loads configuration, wires the Yahoo provider into the shared state and
// serves the dashboard API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod analysis;
mod api;
mod app_state;
mod error;
mod indicators;
mod market_data;
mod runtime_config;
mod types;
mod yahoo;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::DashboardConfig;
use crate::yahoo::YahooClient;

const DEFAULT_CONFIG_PATH: &str = "dashboard_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Stock Tracker starting up");

    let config_path =
        std::env::var("STOCK_TRACKER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = if std::path::Path::new(&config_path).exists() {
        DashboardConfig::load(&config_path).unwrap_or_else(|e| {
            warn!(error = %e, path = %config_path, "Failed to load config, using defaults");
            DashboardConfig::default()
        })
    } else {
        // First run: leave an editable copy of the defaults behind.
        let defaults = DashboardConfig::default();
        if let Err(e) = defaults.save(&config_path) {
            error!(error = %e, "Failed to write default config");
        }
        defaults
    };

    if let Ok(addr) = std::env::var("STOCK_TRACKER_BIND_ADDR") {
        config.bind_addr = addr;
    }
    if let Ok(benchmark) = std::env::var("STOCK_TRACKER_BENCHMARK") {
        let benchmark = benchmark.trim().to_uppercase();
        if !benchmark.is_empty() {
            config.benchmark_symbol = benchmark;
        }
    }

    config.validate().context("invalid dashboard configuration")?;

    info!(
        benchmark = %config.benchmark_symbol,
        default_start = %config.default_start,
        default_end = %config.default_end,
        "Dashboard configured"
    );

    // ── 2. Build provider & shared state ─────────────────────────────────
    let yahoo = Arc::new(YahooClient::new(&config)?);
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, yahoo.clone(), yahoo));

    // ── 3. Serve the API ─────────────────────────────────────────────────
    let app = api::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received - stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("Stock Tracker shut down complete.");
    Ok(())
}
