//! # Broker Service Layer
//!
//! ```text
//! BrokerProvider (enum)        <- selected from config
//!   ├── RabbitMq(RabbitMqBroker)
//!   └── InMemory(InMemoryBroker)
//!
//! BrokerClient (trait)         <- contract both variants implement
//! DeliveryStream               <- push-based consumption, one item per delivery
//! ```

mod provider;
pub mod providers;
mod traits;
mod types;

pub use provider::BrokerProvider;
pub use providers::{InMemoryBroker, RabbitMqBroker};
pub use traits::BrokerClient;
pub use types::{AtomicQueueStats, Delivery, DeliveryStream, DeliveryTag, QueueStats};

pub use super::errors::MessagingError;
