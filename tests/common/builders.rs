//! Relay harnesses over the in-memory broker.

use std::sync::Arc;
use std::time::Duration;

use chat_relay::messaging::{BrokerClient, BrokerProvider, InMemoryBroker, QueueMessage};
use chat_relay::models::ChatMessage;
use chat_relay::relay::Relay;
use chat_relay::store::MessageStore;

pub const TEST_QUEUE: &str = "chat_messages_test";

/// Relay whose broker echoes every publish back to the reconcile loop
pub async fn echo_relay() -> Relay {
    relay_over(InMemoryBroker::new()).await
}

/// Relay whose broker only records publishes; deliveries come from `inject`
pub async fn manual_relay() -> Relay {
    relay_over(InMemoryBroker::without_echo()).await
}

pub async fn relay_over(broker: InMemoryBroker) -> Relay {
    broker
        .ensure_queue(TEST_QUEUE, false)
        .await
        .expect("declare test queue");
    Relay::new(
        Arc::new(MessageStore::new()),
        Arc::new(BrokerProvider::InMemory(broker)),
        TEST_QUEUE,
    )
}

pub fn in_memory(relay: &Relay) -> &InMemoryBroker {
    relay
        .broker()
        .as_in_memory()
        .expect("test relay uses the in-memory broker")
}

/// Push a message's wire form onto the relay's queue
pub async fn inject_message(relay: &Relay, message: &ChatMessage) {
    let payload = message.to_bytes().expect("encode");
    inject_raw(relay, payload).await;
}

pub async fn inject_raw(relay: &Relay, payload: impl Into<Vec<u8>>) {
    in_memory(relay)
        .inject(relay.queue_name(), payload)
        .await
        .expect("inject payload");
}

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub const WAIT: Duration = Duration::from_secs(2);
