//! NRW dashboard service
//!
//! Serves the loss ranking and fleet KPIs over HTTP, backed by a JSON-lines
//! snapshot store.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use nrw_store::JsonlStore;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Observability
    nrw_obs::init("nrwd");

    // Config
    let cfg = nrw_config::AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        nrw_config::AppConfig::default()
    });
    let http_bind = cfg.http_bind();
    let store_dir = cfg.store_dir();

    // Store
    let store = JsonlStore::new(&store_dir)
        .with_context(|| format!("failed to open store at {store_dir}"))?;
    tracing::info!(dir = %store_dir, "snapshot store opened");

    // Build app and state
    let (app, state) = nrw_service::build_app(Arc::new(store))?;

    // Start HTTP server
    let addr: SocketAddr = http_bind
        .parse()
        .with_context(|| format!("invalid HTTP bind address {http_bind}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    // Mark ready just before serving
    nrw_service::set_ready(&state, true);

    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("NRW service stopped");
    Ok(())
}

/// Resolves on Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
