//! # Reconcile Loop
//!
//! Background task that consumes the relay's queue and marks each observed
//! message `delivered` in the store. One bad payload is logged and skipped;
//! the loop ends only on an explicit stop or when the subscription closes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Relay;
use crate::error::RelayError;
use crate::messaging::DeliveryStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` was called or the handle was dropped
    Requested,
    /// The broker subscription ended
    StreamClosed,
}

/// What the loop saw before it exited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub received: u64,
    pub reconciled: u64,
    pub decode_failures: u64,
    pub not_found: u64,
    pub stream_errors: u64,
    pub stop_reason: Option<StopReason>,
}

/// Owner of a running reconcile loop
///
/// Dropping the handle stops the loop.
#[derive(Debug)]
pub struct ReconcilerHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<ReconcileSummary>,
    is_running: Arc<AtomicBool>,
}

impl ReconcilerHandle {
    pub(crate) fn spawn(relay: Relay, deliveries: DeliveryStream) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let is_running = Arc::new(AtomicBool::new(true));
        let task = tokio::spawn(run_reconcile_loop(
            relay,
            deliveries,
            stop_rx,
            Arc::clone(&is_running),
        ));

        Self {
            stop_tx: Some(stop_tx),
            task,
            is_running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    /// Signal the loop to stop and wait for it to finish
    pub async fn stop(mut self) -> Result<ReconcileSummary, RelayError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Err means the loop already exited on its own
            let _ = stop_tx.send(());
        }
        self.await_task().await
    }

    /// Wait for the loop to end on its own (subscription closed)
    pub async fn join(mut self) -> Result<ReconcileSummary, RelayError> {
        let _keep_alive = self.stop_tx.take();
        self.await_task().await
    }

    async fn await_task(self) -> Result<ReconcileSummary, RelayError> {
        self.task
            .await
            .map_err(|e| RelayError::Shutdown(format!("reconcile task failed: {}", e)))
    }
}

async fn run_reconcile_loop(
    relay: Relay,
    mut deliveries: DeliveryStream,
    mut stop_rx: oneshot::Receiver<()>,
    is_running: Arc<AtomicBool>,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    info!(queue = %relay.queue_name(), "🔄 Reconcile loop started");

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => {
                summary.stop_reason = Some(StopReason::Requested);
                break;
            }

            next = deliveries.next() => {
                match next {
                    Some(Ok(delivery)) => {
                        summary.received += 1;
                        match relay.reconcile_payload(&delivery.payload) {
                            Ok(outcome) if outcome.is_not_found() => {
                                summary.not_found += 1;
                                debug!(tag = %delivery.delivery_tag, "Reconciled message no longer stored");
                            }
                            Ok(outcome) => {
                                summary.reconciled += 1;
                                debug!(tag = %delivery.delivery_tag, outcome = ?outcome, "Delivery reconciled");
                            }
                            Err(e) => {
                                summary.decode_failures += 1;
                                warn!(
                                    queue = %delivery.queue_name,
                                    payload_bytes = delivery.payload_len(),
                                    error = %e,
                                    "Skipping undecodable delivery"
                                );
                            }
                        }
                    }
                    Some(Err(e)) => {
                        summary.stream_errors += 1;
                        warn!(queue = %relay.queue_name(), error = %e, "Delivery error from broker");
                    }
                    None => {
                        summary.stop_reason = Some(StopReason::StreamClosed);
                        warn!(queue = %relay.queue_name(), "Subscription closed, reconcile loop ending");
                        break;
                    }
                }
            }
        }
    }

    is_running.store(false, Ordering::SeqCst);
    info!(
        received = summary.received,
        reconciled = summary.reconciled,
        decode_failures = summary.decode_failures,
        not_found = summary.not_found,
        stop_reason = ?summary.stop_reason,
        "🔄 Reconcile loop stopped"
    );
    summary
}
