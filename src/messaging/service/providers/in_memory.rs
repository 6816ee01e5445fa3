//! # In-Memory Broker Client
//!
//! Process-local queues for tests and for running the relay without a broker.
//!
//! - Each queue is an unbounded channel with exactly one subscriber
//! - Echo mode (default) loops published payloads back to the subscriber,
//!   which is what a single relay consuming its own queue observes
//! - `inject` delivers arbitrary bytes as if another producer had published
//! - `set_send_failure` makes every send fail until cleared
//! - `close` drops all queues; active subscription streams end

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

use crate::messaging::service::traits::BrokerClient;
use crate::messaging::service::types::{
    AtomicQueueStats, Delivery, DeliveryStream, DeliveryTag, QueueStats,
};
use crate::messaging::MessagingError;

#[derive(Debug)]
struct InMemoryQueue {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    /// Taken by the first subscriber
    receiver: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
    durable: bool,
    /// Payloads accepted by `send` while echo is off; echoed payloads live only in the channel
    published: Vec<Vec<u8>>,
    stats: Arc<AtomicQueueStats>,
}

impl InMemoryQueue {
    fn new(durable: bool) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
            durable,
            published: Vec::new(),
            stats: Arc::new(AtomicQueueStats::default()),
        }
    }

    fn pending(&self) -> u64 {
        self.receiver.as_ref().map_or(0, |rx| rx.len() as u64)
    }
}

/// In-memory broker for tests and local development
///
/// ```rust
/// use chat_relay::messaging::{BrokerClient, InMemoryBroker};
/// use futures::StreamExt;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let broker = InMemoryBroker::new();
/// broker.ensure_queue("chat_messages", false).await?;
/// let mut deliveries = broker.subscribe("chat_messages").await?;
///
/// broker.send("chat_messages", b"{}").await?;
/// let delivery = deliveries.next().await.expect("open")?;
/// assert_eq!(delivery.payload, b"{}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct InMemoryBroker {
    queues: RwLock<HashMap<String, InMemoryQueue>>,
    echo: bool,
    fail_sends: AtomicBool,
    closed: AtomicBool,
    next_tag: Arc<AtomicU64>,
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBroker {
    /// Broker that echoes published payloads to the subscriber
    pub fn new() -> Self {
        Self::with_echo(true)
    }

    /// Broker whose `send` only records payloads; deliveries come from `inject`
    pub fn without_echo() -> Self {
        Self::with_echo(false)
    }

    fn with_echo(echo: bool) -> Self {
        Self {
            queues: RwLock::new(HashMap::new()),
            echo,
            fail_sends: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            next_tag: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Make every subsequent `send` fail (or succeed again)
    pub fn set_send_failure(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Deliver raw bytes to a queue's subscriber, bypassing `send`
    pub async fn inject(&self, queue_name: &str, payload: impl Into<Vec<u8>>) -> Result<(), MessagingError> {
        self.ensure_open(queue_name)?;
        let queues = self.queues.read().await;
        let queue = queues
            .get(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        queue
            .sender
            .send(payload.into())
            .map_err(|_| MessagingError::send(queue_name, "queue receiver dropped"))
    }

    /// Number of successful sends to a queue
    pub async fn sent_count(&self, queue_name: &str) -> u64 {
        self.queues
            .read()
            .await
            .get(queue_name)
            .map_or(0, |q| q.stats.snapshot(queue_name, None).total_sent)
    }

    /// Payloads accepted by `send`, oldest first (always empty in echo mode)
    pub async fn published(&self, queue_name: &str) -> Vec<Vec<u8>> {
        self.queues
            .read()
            .await
            .get(queue_name)
            .map(|q| q.published.clone())
            .unwrap_or_default()
    }

    pub async fn is_durable(&self, queue_name: &str) -> Option<bool> {
        self.queues.read().await.get(queue_name).map(|q| q.durable)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self, queue_name: &str) -> Result<(), MessagingError> {
        if self.is_closed() {
            return Err(MessagingError::channel(format!(
                "broker closed, cannot use queue {}",
                queue_name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BrokerClient for InMemoryBroker {
    async fn ensure_queue(&self, queue_name: &str, durable: bool) -> Result<(), MessagingError> {
        self.ensure_open(queue_name)?;
        let mut queues = self.queues.write().await;
        queues
            .entry(queue_name.to_string())
            .or_insert_with(|| InMemoryQueue::new(durable));
        Ok(())
    }

    async fn send(&self, queue_name: &str, payload: &[u8]) -> Result<(), MessagingError> {
        self.ensure_open(queue_name)?;
        let mut queues = self.queues.write().await;
        let queue = queues
            .get_mut(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        if self.fail_sends.load(Ordering::SeqCst) {
            queue.stats.record_send_failure();
            return Err(MessagingError::send(queue_name, "simulated broker failure"));
        }

        if self.echo {
            if queue.sender.send(payload.to_vec()).is_err() {
                queue.stats.record_send_failure();
                return Err(MessagingError::send(queue_name, "queue receiver dropped"));
            }
        } else {
            queue.published.push(payload.to_vec());
        }

        queue.stats.record_sent();
        debug!(queue = %queue_name, bytes = payload.len(), "In-memory send");
        Ok(())
    }

    async fn subscribe(&self, queue_name: &str) -> Result<DeliveryStream, MessagingError> {
        self.ensure_open(queue_name)?;
        let mut queues = self.queues.write().await;
        let queue = queues
            .get_mut(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;

        let receiver = queue
            .receiver
            .take()
            .ok_or_else(|| MessagingError::already_subscribed(queue_name))?;

        let stats = Arc::clone(&queue.stats);
        let tags = Arc::clone(&self.next_tag);
        let queue_name = queue_name.to_string();

        let deliveries = stream::unfold(receiver, move |mut rx| {
            let stats = Arc::clone(&stats);
            let tags = Arc::clone(&tags);
            let queue_name = queue_name.clone();
            async move {
                let payload = rx.recv().await?;
                stats.record_received();
                let tag = DeliveryTag(tags.fetch_add(1, Ordering::Relaxed));
                Some((Ok::<_, MessagingError>(Delivery::new(queue_name, tag, payload)), rx))
            }
        });

        Ok(Box::pin(deliveries))
    }

    async fn queue_stats(&self, queue_name: &str) -> Result<QueueStats, MessagingError> {
        let queues = self.queues.read().await;
        let queue = queues
            .get(queue_name)
            .ok_or_else(|| MessagingError::queue_not_found(queue_name))?;
        Ok(queue.stats.snapshot(queue_name, Some(queue.pending())))
    }

    async fn health_check(&self) -> Result<bool, MessagingError> {
        if self.is_closed() {
            return Err(MessagingError::health_check("in-memory broker is closed"));
        }
        Ok(true)
    }

    async fn close(&self) -> Result<(), MessagingError> {
        self.closed.store(true, Ordering::SeqCst);
        // Dropping the senders ends every subscription stream once drained
        self.queues.write().await.clear();
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
