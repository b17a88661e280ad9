//! RoboBot Daemon - conversational support endpoint
//!
//! Answers chat messages from the FAQ knowledge base and simple intent rules,
//! logging every exchange.

use anyhow::{Context, Result};
use robobot_common::config::ChatConfig;
use robobot_common::mode_gate::ModeGate;
use robobot_common::provider::mask_credential;
use robobotd::server::{self, AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("RoboBot Daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = ChatConfig::load().context("Failed to load configuration")?;

    match config.mode.api_key.as_deref() {
        Some(key) => info!("API key loaded: {}", mask_credential(key)),
        None => warn!("OPENAI_API_KEY is not set; real mode needs a per-request key"),
    }
    let mode = if config.mode.use_mock { "mock" } else { "real" };
    info!("Mode: {}", mode);

    let gate = ModeGate::from_config(&config).with_context(|| {
        format!(
            "Failed to load knowledge base from {}",
            config.storage.kb_file.display()
        )
    })?;
    info!(
        "Knowledge base ready: {} entries",
        gate.heuristic().resolver().knowledge().len()
    );
    info!("Conversation log: {}", config.storage.log_file.display());

    server::run(AppState::new(gate), &config.server.bind).await?;

    info!("RoboBot Daemon stopped");
    Ok(())
}
