//! # Relay
//!
//! Couples the local [`MessageStore`] to the broker.
//!
//! - **Publish**: insert locally (status `sent`), then send to the queue
//! - **Reconcile**: every payload observed on the queue marks the matching
//!   local record `delivered`
//! - **MarkRead**: local-only transition to `read`
//!
//! The local record is written before the broker sees the message, so an
//! echo can never arrive ahead of the record it reconciles.

mod reconciler;
mod stats;

use std::sync::Arc;

use tracing::debug;

pub use reconciler::{ReconcileSummary, ReconcilerHandle, StopReason};
pub use stats::{RelayStats, RelayStatsSnapshot};

use crate::error::{RelayError, Result};
use crate::logging::{log_error, log_relay_operation};
use crate::messaging::{BrokerProvider, QueueMessage};
use crate::models::{ChatMessage, MessageDraft, MessageId};
use crate::state_machine::DeliveryState;
use crate::store::{MessageStore, StatusUpdate};

/// Cheap to clone; clones share store, broker and counters
#[derive(Debug, Clone)]
pub struct Relay {
    store: Arc<MessageStore>,
    broker: Arc<BrokerProvider>,
    queue_name: Arc<str>,
    stats: Arc<RelayStats>,
}

impl Relay {
    pub fn new(store: Arc<MessageStore>, broker: Arc<BrokerProvider>, queue_name: impl Into<String>) -> Self {
        Self {
            store,
            broker,
            queue_name: Arc::from(queue_name.into()),
            stats: Arc::new(RelayStats::default()),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    pub fn store(&self) -> &Arc<MessageStore> {
        &self.store
    }

    pub fn broker(&self) -> &Arc<BrokerProvider> {
        &self.broker
    }

    /// Store a new message and send it to the queue
    ///
    /// On a send failure the record stays stored in `sent` and is returned
    /// inside [`RelayError::Delivery`].
    pub async fn publish(&self, draft: MessageDraft) -> Result<ChatMessage> {
        if draft.content.trim().is_empty() {
            return Err(RelayError::validation("Content cannot be empty"));
        }

        let (message, payload) = self
            .store
            .try_insert(draft, |message| message.to_bytes())
            .map_err(|e| {
                self.stats.record_publish_failure();
                RelayError::Encoding(e.to_string())
            })?;

        if let Err(source) = self.broker.send(&self.queue_name, &payload).await {
            self.stats.record_publish_failure();
            log_error(
                "relay",
                "publish",
                &source.to_string(),
                Some(&format!("message {} kept locally as sent", message.id)),
            );
            return Err(RelayError::delivery(message, source));
        }

        self.stats.record_published();
        log_relay_operation("publish", Some(message.id.value()), "sent", None);
        Ok(message)
    }

    /// Apply one observed queue payload to the store
    pub fn reconcile_payload(&self, payload: &[u8]) -> Result<StatusUpdate> {
        let observed = ChatMessage::from_bytes(payload).map_err(|e| {
            self.stats.record_decode_failure();
            RelayError::Decoding(e.to_string())
        })?;

        let outcome = self.store.update_status(observed.id, DeliveryState::Delivered);
        if outcome.is_not_found() {
            self.stats.record_reconcile_not_found();
        } else {
            self.stats.record_reconciled();
        }

        debug!(message_id = %observed.id, outcome = ?outcome, "Reconciled delivery");
        Ok(outcome)
    }

    /// Subscribe to the queue and run the reconcile loop in the background
    pub async fn start_reconciler(&self) -> Result<ReconcilerHandle> {
        let deliveries = self.broker.subscribe(&self.queue_name).await?;
        Ok(ReconcilerHandle::spawn(self.clone(), deliveries))
    }

    pub fn mark_read(&self, id: MessageId) -> StatusUpdate {
        let outcome = self.store.mark_read(id);
        if outcome.is_applied() {
            log_relay_operation("mark_read", Some(id.value()), "read", None);
        }
        outcome
    }

    pub fn delete(&self, id: MessageId) -> bool {
        let removed = self.store.delete(id);
        if removed {
            log_relay_operation("delete", Some(id.value()), "deleted", None);
        }
        removed
    }

    pub fn get(&self, id: MessageId) -> Option<ChatMessage> {
        self.store.get(id)
    }

    pub fn list_for(&self, participant: &str) -> Vec<ChatMessage> {
        self.store.list_for(participant)
    }

    pub fn list_all(&self) -> Vec<ChatMessage> {
        self.store.list_all()
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot(self.store.len())
    }
}
