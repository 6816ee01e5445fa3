//! Chat Relay Binary
//!
//! Loads configuration, connects the broker, serves the HTTP layer and runs
//! the reconcile loop until Ctrl-C.

use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use chat_relay::bootstrap::RelaySystem;
use chat_relay::config::ConfigManager;
use chat_relay::logging::init_structured_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let manager = ConfigManager::load().context("failed to load configuration")?;
    let config = manager.config().clone();
    init_structured_logging(&config.logging);

    info!(
        environment = %manager.environment(),
        config_file = ?manager.config_file(),
        "Starting chat relay"
    );

    let bind_address = config.web.socket_addr()?;
    let grace = Duration::from_secs(config.web.shutdown_grace_seconds);

    let listener = TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;

    let system = RelaySystem::bootstrap(config)
        .await
        .context("failed to start relay")?;

    let summary = system
        .run(listener, shutdown_signal(), grace)
        .await
        .context("relay stopped with an error")?;

    match summary {
        Some(summary) => info!(
            received = summary.received,
            reconciled = summary.reconciled,
            decode_failures = summary.decode_failures,
            "Chat relay stopped"
        ),
        None => info!("Chat relay stopped"),
    }

    Ok(())
}

async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => warn!(error = %e, "Unable to listen for Ctrl-C, shutting down"),
    }
}
