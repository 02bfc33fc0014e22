// =============================================================================
// NASDAQ Market Analyzer — Main Entry Point
// =============================================================================
//
// Loads configuration and the Alpha Vantage key, logs one text snapshot of
// the dashboard, then serves the dashboard API until Ctrl+C.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod alphavantage;
mod api;
mod dashboard;
mod indicators;
mod market_data;
mod render;
mod runtime_config;
mod sentiment;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::alphavantage::AlphaVantageClient;
use crate::dashboard::Dashboard;
use crate::runtime_config::{ApiCredential, RuntimeConfig, API_KEY_ENV};
use crate::sentiment::FinancialLexicon;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("NASDAQ Market Analyzer — starting up");

    let config_path =
        std::env::var("ANALYZER_CONFIG").unwrap_or_else(|_| "analyzer_config.json".into());
    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    if let Ok(addr) = std::env::var("ANALYZER_BIND_ADDR") {
        config.bind_addr = addr;
    }

    let credential = ApiCredential::from_env();
    if !credential.is_present() {
        warn!(
            env = API_KEY_ENV,
            "No API key configured — every market-data section will report no data"
        );
    }

    info!(
        symbols = ?config.symbols.iter().map(|s| s.ticker.as_str()).collect::<Vec<_>>(),
        chart_symbol = %config.chart_symbol,
        rsi_window = config.rsi_window,
        "Configured dashboard"
    );

    // ── 2. Build the dashboard ───────────────────────────────────────────
    let client = AlphaVantageClient::new(&config, credential)?;
    let bind_addr = config.bind_addr.clone();
    let dashboard = Arc::new(Dashboard::new(
        config,
        client,
        Box::new(FinancialLexicon::new()),
    ));

    // ── 3. Initial snapshot ──────────────────────────────────────────────
    let snapshot = dashboard.snapshot().await;
    for line in render::render_text(&snapshot).lines() {
        info!("{line}");
    }

    // ── 4. Serve the API ─────────────────────────────────────────────────
    let app = api::rest::router(dashboard);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening. Press Ctrl+C to stop.");

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let mut server = tokio::spawn(api::rest::serve(listener, app, async move {
        let _ = stop_rx.await;
    }));

    tokio::select! {
        joined = &mut server => {
            return joined.context("API server task panicked")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl+C")?;
        }
    }

    warn!("Shutdown signal received — stopping gracefully");
    let _ = stop_tx.send(());
    server.await.context("API server task panicked")??;

    info!("NASDAQ Market Analyzer shut down complete.");
    Ok(())
}
