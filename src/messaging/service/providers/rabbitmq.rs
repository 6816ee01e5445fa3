//! # RabbitMQ Broker Client
//!
//! `BrokerClient` over AMQP 0.9.1 using the `lapin` crate.
//!
//! - One connection and one channel per client
//! - Publishes go through the default exchange with routing key = queue name
//! - Consumers run in auto-ack mode; a delivery is acknowledged on receipt
//! - No reconnect: once the connection drops, the subscription stream ends
//!
//! ## Usage
//!
//! ```ignore
//! use chat_relay::config::BrokerConfig;
//! use chat_relay::messaging::{BrokerClient, RabbitMqBroker};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let broker = RabbitMqBroker::connect(&BrokerConfig::default()).await?;
//! broker.ensure_queue("chat_messages", false).await?;
//! broker.send("chat_messages", br#"{"id":1,"content":"hi"}"#).await?;
//! # Ok(())
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use lapin::options::{
    BasicConsumeOptions, BasicPublishOptions, BasicQosOptions, QueueDeclareOptions,
};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::BrokerConfig;
use crate::constants::WIRE_CONTENT_TYPE;
use crate::messaging::service::traits::BrokerClient;
use crate::messaging::service::types::{
    AtomicQueueStats, Delivery, DeliveryStream, DeliveryTag, QueueStats,
};
use crate::messaging::MessagingError;

const TRANSIENT_DELIVERY_MODE: u8 = 1;
const PERSISTENT_DELIVERY_MODE: u8 = 2;
const REPLY_SUCCESS: u16 = 200;

/// RabbitMQ-backed broker client
#[derive(Debug)]
pub struct RabbitMqBroker {
    connection: Connection,
    channel: Channel,
    config: BrokerConfig,
    /// Queues declared durable through this client
    durable_queues: Arc<RwLock<HashSet<String>>>,
    queue_stats: Arc<RwLock<HashMap<String, Arc<AtomicQueueStats>>>>,
}

impl RabbitMqBroker {
    /// Open a connection and a channel, and apply the configured prefetch
    pub async fn connect(config: &BrokerConfig) -> Result<Self, MessagingError> {
        Self::from_config(config.clone()).await
    }

    pub async fn from_config(config: BrokerConfig) -> Result<Self, MessagingError> {
        info!(
            url = %config.redacted_url(),
            connection_name = %config.connection_name,
            "🐇 Connecting to RabbitMQ"
        );

        let connect = Connection::connect(
            &config.url,
            ConnectionProperties::default()
                .with_connection_name(config.connection_name.clone().into()),
        );

        let connection =
            tokio::time::timeout(Duration::from_secs(config.connect_timeout_seconds), connect)
                .await
                .map_err(|_| {
                    MessagingError::connection(format!(
                        "RabbitMQ connection timed out after {}s",
                        config.connect_timeout_seconds
                    ))
                })?
                .map_err(|e| {
                    MessagingError::connection(format!("RabbitMQ connection failed: {}", e))
                })?;

        let channel = connection.create_channel().await.map_err(|e| {
            MessagingError::channel(format!("RabbitMQ channel creation failed: {}", e))
        })?;

        channel
            .basic_qos(config.prefetch_count, BasicQosOptions::default())
            .await
            .map_err(|e| {
                MessagingError::configuration("rabbitmq", format!("Failed to set QoS: {}", e))
            })?;

        Ok(Self {
            connection,
            channel,
            config,
            durable_queues: Arc::new(RwLock::new(HashSet::new())),
            queue_stats: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    async fn get_or_create_stats(&self, queue_name: &str) -> Arc<AtomicQueueStats> {
        let stats = self.queue_stats.read().await;
        if let Some(s) = stats.get(queue_name) {
            return s.clone();
        }
        drop(stats);

        let mut stats = self.queue_stats.write().await;
        stats
            .entry(queue_name.to_string())
            .or_insert_with(|| Arc::new(AtomicQueueStats::default()))
            .clone()
    }

    async fn delivery_mode_for(&self, queue_name: &str) -> u8 {
        if self.durable_queues.read().await.contains(queue_name) {
            PERSISTENT_DELIVERY_MODE
        } else {
            TRANSIENT_DELIVERY_MODE
        }
    }

    fn consumer_tag(&self) -> String {
        format!("{}-{}", self.config.connection_name, Uuid::new_v4())
    }
}

#[async_trait]
impl BrokerClient for RabbitMqBroker {
    async fn ensure_queue(&self, queue_name: &str, durable: bool) -> Result<(), MessagingError> {
        self.channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    durable,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                MessagingError::queue_declare(queue_name, format!("Queue declare failed: {}", e))
            })?;

        if durable {
            self.durable_queues
                .write()
                .await
                .insert(queue_name.to_string());
        }

        debug!(queue = %queue_name, durable, "Queue declared");
        Ok(())
    }

    async fn send(&self, queue_name: &str, payload: &[u8]) -> Result<(), MessagingError> {
        let stats = self.get_or_create_stats(queue_name).await;
        let delivery_mode = self.delivery_mode_for(queue_name).await;

        let publish = self
            .channel
            .basic_publish(
                "",
                queue_name,
                BasicPublishOptions::default(),
                payload,
                BasicProperties::default()
                    .with_delivery_mode(delivery_mode)
                    .with_content_type(WIRE_CONTENT_TYPE.into()),
            )
            .await;

        let confirm = match publish {
            Ok(confirm) => confirm,
            Err(e) => {
                stats.record_send_failure();
                return Err(MessagingError::send(
                    queue_name,
                    format!("Publish failed: {}", e),
                ));
            }
        };

        if let Err(e) = confirm.await {
            stats.record_send_failure();
            return Err(MessagingError::send(
                queue_name,
                format!("Publish confirmation failed: {}", e),
            ));
        }

        stats.record_sent();
        Ok(())
    }

    async fn subscribe(&self, queue_name: &str) -> Result<DeliveryStream, MessagingError> {
        let consumer_tag = self.consumer_tag();
        let consumer = self
            .channel
            .basic_consume(
                queue_name,
                &consumer_tag,
                BasicConsumeOptions {
                    no_ack: true,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| {
                MessagingError::subscribe(queue_name, format!("basic_consume failed: {}", e))
            })?;

        info!(queue = %queue_name, consumer_tag = %consumer_tag, "📥 Consumer registered");

        let stats = self.get_or_create_stats(queue_name).await;
        let queue = queue_name.to_string();
        let stream = consumer.map(move |item| match item {
            Ok(delivery) => {
                stats.record_received();
                Ok(Delivery::new(
                    queue.clone(),
                    DeliveryTag(delivery.delivery_tag),
                    delivery.data,
                )
                .with_redelivered(delivery.redelivered))
            }
            Err(e) => Err(MessagingError::receive(
                queue.clone(),
                format!("Consumer error: {}", e),
            )),
        });

        Ok(Box::pin(stream))
    }

    async fn queue_stats(&self, queue_name: &str) -> Result<QueueStats, MessagingError> {
        let durable = self.durable_queues.read().await.contains(queue_name);
        let queue_state = self
            .channel
            .queue_declare(
                queue_name,
                QueueDeclareOptions {
                    passive: true,
                    durable,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(|e| MessagingError::queue_not_found(format!("{}: {}", queue_name, e)))?;

        let ours = self.get_or_create_stats(queue_name).await;
        Ok(ours.snapshot(queue_name, Some(u64::from(queue_state.message_count()))))
    }

    async fn health_check(&self) -> Result<bool, MessagingError> {
        if self.connection.status().connected() {
            Ok(true)
        } else {
            Err(MessagingError::health_check(
                "RabbitMQ connection is not connected",
            ))
        }
    }

    async fn close(&self) -> Result<(), MessagingError> {
        if !self.connection.status().connected() {
            return Ok(());
        }

        if let Err(e) = self.channel.close(REPLY_SUCCESS, "relay shutdown").await {
            warn!(error = %e, "Channel close failed");
        }

        self.connection
            .close(REPLY_SUCCESS, "relay shutdown")
            .await
            .map_err(|e| MessagingError::connection(format!("Connection close failed: {}", e)))?;

        info!("🐇 RabbitMQ connection closed");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "rabbitmq"
    }
}
