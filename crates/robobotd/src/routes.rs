//! API routes for robobotd
//!
//! POST /chat answers a message; GET /health reports liveness and mode.

use crate::server::AppState;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use robobot_common::{ChatRequest, ChatResponse, HealthResponse, CREDENTIAL_HEADER};
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

type AppStateArc = Arc<AppState>;

// ============================================================================
// Chat Routes
// ============================================================================

pub fn chat_routes() -> Router<AppStateArc> {
    Router::new().route("/chat", post(chat))
}

async fn chat(
    State(state): State<AppStateArc>,
    headers: HeaderMap,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let request_id = Uuid::new_v4();
    let credential = headers
        .get(CREDENTIAL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // Gate work does blocking file I/O
    let gate = Arc::clone(&state.gate);
    let outcome = tokio::task::spawn_blocking(move || {
        gate.handle(&req.message, req.user_id.as_deref(), credential.as_deref())
    })
    .await
    .map_err(|e| {
        error!("  Chat request {} failed: {}", request_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    info!(
        "  Chat request {} answered in {} mode (logged: {})",
        request_id, outcome.mode, outcome.logged
    );

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        meta: Some(outcome.meta),
    }))
}

// ============================================================================
// Health Routes
// ============================================================================

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    let gate = &state.gate;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        mode: if gate.is_mock() { "mock" } else { "real" }.to_string(),
        kb_entries: gate.heuristic().resolver().knowledge().len(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
