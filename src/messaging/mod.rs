//! # Messaging
//!
//! Broker abstraction, wire codec and messaging errors.

pub mod codec;
mod errors;
pub mod service;

pub use codec::QueueMessage;
pub use errors::MessagingError;
pub use service::{
    BrokerClient, BrokerProvider, Delivery, DeliveryStream, DeliveryTag, InMemoryBroker,
    QueueStats, RabbitMqBroker,
};
