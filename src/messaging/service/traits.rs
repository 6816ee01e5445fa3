//! # Broker Client Trait
//!
//! The contract the relay depends on. Implementations wrap a concrete broker
//! (RabbitMQ) or emulate one in memory.

use async_trait::async_trait;

use super::types::{DeliveryStream, QueueStats};
use super::MessagingError;

/// Core broker operations
///
/// Connection and channel setup happen in each provider's constructor, so a
/// value of this trait is always an open connection with one channel.
#[async_trait]
pub trait BrokerClient: Send + Sync + 'static {
    /// Declare a queue (idempotent)
    async fn ensure_queue(&self, queue_name: &str, durable: bool) -> Result<(), MessagingError>;

    /// Publish raw bytes to a queue through the default exchange
    async fn send(&self, queue_name: &str, payload: &[u8]) -> Result<(), MessagingError>;

    /// Start consuming a queue
    ///
    /// Deliveries are acknowledged on receipt. The stream yields until the
    /// channel is closed and cannot be restarted.
    async fn subscribe(&self, queue_name: &str) -> Result<DeliveryStream, MessagingError>;

    /// Counters for a queue
    async fn queue_stats(&self, queue_name: &str) -> Result<QueueStats, MessagingError>;

    /// Whether the broker connection is usable
    async fn health_check(&self) -> Result<bool, MessagingError>;

    /// Close channel and connection; active subscriptions end
    async fn close(&self) -> Result<(), MessagingError>;

    /// Provider name for logging
    fn provider_name(&self) -> &'static str;
}
