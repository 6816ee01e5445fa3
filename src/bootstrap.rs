//! # Relay Bootstrap
//!
//! Brings the relay up in dependency order and tears it down in reverse:
//!
//! 1. connect the broker (fatal on failure)
//! 2. declare the queue
//! 3. build store and relay
//! 4. start the reconcile loop
//!
//! Shutdown stops the reconcile loop, then closes the broker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::constants::providers;
use crate::error::{RelayError, Result};
use crate::logging::log_broker_operation;
use crate::messaging::BrokerProvider;
use crate::relay::{ReconcileSummary, ReconcilerHandle, Relay};
use crate::store::MessageStore;
use crate::web::{create_app, AppState};

/// Handle to a running relay
#[derive(Debug)]
pub struct RelaySystemHandle {
    relay: Relay,
    config: Arc<RelayConfig>,
    /// Some while the reconcile loop is owned by this handle
    reconciler: Option<ReconcilerHandle>,
}

impl RelaySystemHandle {
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciler
            .as_ref()
            .is_some_and(ReconcilerHandle::is_running)
    }

    pub fn app_state(&self) -> AppState {
        AppState::new(self.relay.clone(), Arc::clone(&self.config))
    }

    pub fn router(&self) -> Router {
        create_app(self.app_state())
    }

    /// Serve HTTP until `shutdown` resolves; in-flight requests finish first
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener
            .local_addr()
            .map_err(|e| RelayError::Configuration(format!("listener address unavailable: {}", e)))?;
        info!(address = %local_addr, "🌐 HTTP server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| RelayError::Shutdown(format!("HTTP server error: {}", e)))
    }

    /// Serve until `shutdown` resolves, then tear the relay down within `grace`.
    ///
    /// Teardown runs whether or not serving succeeded; a serve error is
    /// reported after the reconciler and broker are stopped.
    pub async fn run<F>(
        self,
        listener: TcpListener,
        shutdown: F,
        grace: Duration,
    ) -> Result<Option<ReconcileSummary>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = self.serve(listener, shutdown).await;
        match &served {
            Ok(()) => info!("HTTP server drained"),
            Err(e) => warn!(error = %e, "HTTP server failed, shutting down"),
        }

        let teardown = match tokio::time::timeout(grace, self.shutdown()).await {
            Ok(result) => result,
            Err(_) => {
                warn!(grace_seconds = grace.as_secs(), "Shutdown grace period elapsed");
                Ok(None)
            }
        };

        served?;
        teardown
    }

    /// Stop the reconcile loop, then close the broker
    pub async fn shutdown(mut self) -> Result<Option<ReconcileSummary>> {
        info!("🛑 Relay shutdown requested");

        let summary = match self.reconciler.take() {
            Some(reconciler) => Some(reconciler.stop().await?),
            None => None,
        };

        if let Err(e) = self.relay.broker().close().await {
            warn!(error = %e, "Broker close failed during shutdown");
            return Err(RelayError::Shutdown(e.to_string()));
        }

        info!("✅ Relay shut down");
        Ok(summary)
    }
}

pub struct RelaySystem;

impl RelaySystem {
    /// Connect the configured broker and start the relay
    pub async fn bootstrap(config: RelayConfig) -> Result<RelaySystemHandle> {
        info!("🚀 BOOTSTRAP: Starting chat relay");
        config.validate()?;
        let broker = BrokerProvider::from_config(&config.broker).await?;
        Self::bootstrap_with_broker(config, broker).await
    }

    /// Start the relay on an already-constructed broker
    pub async fn bootstrap_with_broker(
        config: RelayConfig,
        broker: BrokerProvider,
    ) -> Result<RelaySystemHandle> {
        config.validate()?;
        let queue_name = config.broker.queue_name.clone();

        broker
            .ensure_queue(&queue_name, config.broker.durable)
            .await?;
        log_broker_operation(
            "ensure_queue",
            &queue_name,
            "declared",
            Some(if config.broker.durable { "durable" } else { "transient" }),
        );

        let relay = Relay::new(Arc::new(MessageStore::new()), Arc::new(broker), queue_name);
        let reconciler = relay.start_reconciler().await?;

        info!(
            provider = relay.broker().provider_name(),
            queue = %relay.queue_name(),
            "🎉 BOOTSTRAP: Chat relay started"
        );

        Ok(RelaySystemHandle {
            relay,
            config: Arc::new(config),
            reconciler: Some(reconciler),
        })
    }

    /// In-memory relay with default settings, for tests and local runs
    pub async fn bootstrap_in_memory() -> Result<RelaySystemHandle> {
        let mut config = RelayConfig::default();
        config.broker.provider = providers::IN_MEMORY.to_string();
        Self::bootstrap_with_broker(config, BrokerProvider::in_memory()).await
    }
}
