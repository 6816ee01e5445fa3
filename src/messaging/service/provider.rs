//! # Broker Provider Enum
//!
//! Enum dispatch over the concrete broker clients.

use tracing::info;

use super::providers::{InMemoryBroker, RabbitMqBroker};
use super::traits::BrokerClient;
use super::types::{DeliveryStream, QueueStats};
use super::MessagingError;
use crate::config::BrokerConfig;
use crate::constants::providers;

/// Broker selected at startup
///
/// The relay holds one of these instead of `Arc<dyn BrokerClient>`, so the
/// in-memory variant stays reachable for test hooks.
#[derive(Debug)]
pub enum BrokerProvider {
    /// RabbitMQ via lapin
    RabbitMq(RabbitMqBroker),

    /// Process-local queues
    InMemory(InMemoryBroker),
}

impl BrokerProvider {
    /// Build the provider named by `config.provider`
    pub async fn from_config(config: &BrokerConfig) -> Result<Self, MessagingError> {
        let provider = match config.provider.as_str() {
            providers::RABBITMQ => Self::RabbitMq(RabbitMqBroker::connect(config).await?),
            providers::IN_MEMORY => Self::InMemory(InMemoryBroker::new()),
            other => {
                return Err(MessagingError::configuration(
                    "broker.provider",
                    format!(
                        "unknown provider '{}', expected '{}' or '{}'",
                        other,
                        providers::RABBITMQ,
                        providers::IN_MEMORY
                    ),
                ))
            }
        };

        info!(provider = provider.provider_name(), "Broker provider ready");
        Ok(provider)
    }

    pub fn in_memory() -> Self {
        Self::InMemory(InMemoryBroker::new())
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::RabbitMq(s) => s.provider_name(),
            Self::InMemory(s) => s.provider_name(),
        }
    }

    /// Test hooks of the in-memory provider, if that is what this is
    pub fn as_in_memory(&self) -> Option<&InMemoryBroker> {
        match self {
            Self::InMemory(s) => Some(s),
            Self::RabbitMq(_) => None,
        }
    }

    pub async fn ensure_queue(&self, queue_name: &str, durable: bool) -> Result<(), MessagingError> {
        match self {
            Self::RabbitMq(s) => s.ensure_queue(queue_name, durable).await,
            Self::InMemory(s) => s.ensure_queue(queue_name, durable).await,
        }
    }

    pub async fn send(&self, queue_name: &str, payload: &[u8]) -> Result<(), MessagingError> {
        match self {
            Self::RabbitMq(s) => s.send(queue_name, payload).await,
            Self::InMemory(s) => s.send(queue_name, payload).await,
        }
    }

    pub async fn subscribe(&self, queue_name: &str) -> Result<DeliveryStream, MessagingError> {
        match self {
            Self::RabbitMq(s) => s.subscribe(queue_name).await,
            Self::InMemory(s) => s.subscribe(queue_name).await,
        }
    }

    pub async fn queue_stats(&self, queue_name: &str) -> Result<QueueStats, MessagingError> {
        match self {
            Self::RabbitMq(s) => s.queue_stats(queue_name).await,
            Self::InMemory(s) => s.queue_stats(queue_name).await,
        }
    }

    pub async fn health_check(&self) -> Result<bool, MessagingError> {
        match self {
            Self::RabbitMq(s) => s.health_check().await,
            Self::InMemory(s) => s.health_check().await,
        }
    }

    pub async fn close(&self) -> Result<(), MessagingError> {
        match self {
            Self::RabbitMq(s) => s.close().await,
            Self::InMemory(s) => s.close().await,
        }
    }
}
