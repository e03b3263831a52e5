// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Swipe-Tracker API Server
//!
//! Polls the attendance portal for badge swipes, keeps the derived status
//! in a local SQLite file, and serves it to the status display.

use std::sync::Arc;
use swipe_tracker::{
    config::Config,
    db::StatusDb,
    services::{PortalClient, RefreshLoop},
    AppState,
};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_logging();

    // Load configuration from environment (and .env if present)
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Swipe-Tracker API");

    let db = StatusDb::open(&config.database_path).expect("Failed to open status database");
    tracing::info!(path = %config.database_path.display(), "Status database ready");

    // One client serves as both authenticator and swipe source
    let portal = Arc::new(PortalClient::new(&config).expect("Failed to build portal client"));

    let state = Arc::new(AppState {
        config: config.clone(),
        db,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresh = RefreshLoop::new(state.clone(), portal.clone(), portal);
    let refresh_handle = tokio::spawn(refresh.run(shutdown_rx));

    let app = swipe_tracker::routes::create_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    if let Err(e) = refresh_handle.await {
        tracing::error!(error = %e, "Refresh task ended abnormally");
    }
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for Ctrl-C, then tell the refresh loop to stop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}

/// Initialize structured logging: JSON by default, `LOG_FORMAT=pretty` for
/// human-readable output.
fn init_logging() {
    let pretty = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("pretty"))
        .unwrap_or(false);

    let json = (!pretty).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .with_current_span(true)
            .flatten_event(true)
    });
    let text = pretty.then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("swipe_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(json)
        .with(text)
        .init();
}
