//! # Messaging Service Types
//!
//! Provider-agnostic shapes for what comes off a queue subscription and for
//! per-queue counters.

use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;

use super::MessagingError;

/// Broker-assigned tag of an inbound delivery
///
/// - RabbitMQ: the channel's delivery tag
/// - InMemory: a per-broker counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DeliveryTag(pub u64);

impl std::fmt::Display for DeliveryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DeliveryTag {
    fn from(tag: u64) -> Self {
        Self(tag)
    }
}

/// Raw payload received from a queue subscription
///
/// Decoding is left to the consumer so that one malformed payload surfaces
/// as a per-item error instead of ending the subscription.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub queue_name: String,
    pub delivery_tag: DeliveryTag,
    pub redelivered: bool,
    pub payload: Vec<u8>,
    pub received_at: DateTime<Utc>,
}

impl Delivery {
    pub fn new(queue_name: impl Into<String>, delivery_tag: DeliveryTag, payload: Vec<u8>) -> Self {
        Self {
            queue_name: queue_name.into(),
            delivery_tag,
            redelivered: false,
            payload,
            received_at: Utc::now(),
        }
    }

    pub fn with_redelivered(mut self, redelivered: bool) -> Self {
        self.redelivered = redelivered;
        self
    }

    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// Infinite, non-restartable sequence of deliveries; ends when the
/// underlying channel closes
pub type DeliveryStream = Pin<Box<dyn Stream<Item = Result<Delivery, MessagingError>> + Send>>;

/// Lock-free per-queue counters shared between send and subscribe paths
#[derive(Debug, Default)]
pub struct AtomicQueueStats {
    total_sent: AtomicU64,
    total_received: AtomicU64,
    send_failures: AtomicU64,
}

impl AtomicQueueStats {
    pub fn record_sent(&self) {
        self.total_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.total_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, queue_name: &str, message_count: Option<u64>) -> QueueStats {
        QueueStats {
            queue_name: queue_name.to_string(),
            message_count,
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_received: self.total_received.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time queue statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queue_name: String,
    /// Messages waiting in the broker, when the provider can tell
    pub message_count: Option<u64>,
    pub total_sent: u64,
    pub total_received: u64,
    pub send_failures: u64,
}
