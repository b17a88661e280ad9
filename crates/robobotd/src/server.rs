//! HTTP server for robobotd

use crate::routes;
use anyhow::Result;
use axum::Router;
use robobot_common::mode_gate::ModeGate;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    /// Reply pipeline: KB, resolver, providers and conversation log
    pub gate: Arc<ModeGate>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(gate: ModeGate) -> Self {
        Self {
            gate: Arc::new(gate),
            start_time: Instant::now(),
        }
    }
}

/// Build the router with all routes mounted
pub fn router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::chat_routes())
        .merge(routes::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until ctrl-c
pub async fn run(state: AppState, addr: &str) -> Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("  Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("Shutting down gracefully");
}
