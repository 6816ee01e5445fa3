//! # Chat Relay
//!
//! Relays chat messages between participants through an AMQP broker and
//! keeps an in-process view of each message's delivery state.
//!
//! ## Overview
//!
//! A message is stored locally as `sent`, then published to a queue. The
//! relay also consumes that queue; each payload it observes marks the
//! matching local record `delivered`. Participants mark messages `read`
//! locally. States only move forward: `sent → delivered → read`.
//!
//! ## Module Organization
//!
//! - [`models`] - `ChatMessage`, `MessageDraft`, `MessageId`
//! - [`state_machine`] - `DeliveryState`
//! - [`store`] - `MessageStore`, the single source of truth
//! - [`messaging`] - broker client trait, RabbitMQ and in-memory providers, wire codec
//! - [`relay`] - publish, reconcile loop, mark read
//! - [`web`] - axum request handlers
//! - [`config`] - YAML configuration with environment overrides
//! - [`logging`] - structured logging setup
//! - [`bootstrap`] - process lifecycle
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chat_relay::bootstrap::RelaySystem;
//! use chat_relay::models::MessageDraft;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let system = RelaySystem::bootstrap_in_memory().await?;
//! let message = system
//!     .relay()
//!     .publish(MessageDraft::direct("alice", "bob", "hello"))
//!     .await?;
//! println!("stored message {} as {}", message.id, message.status);
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod relay;
pub mod state_machine;
pub mod store;
pub mod web;

pub use bootstrap::{RelaySystem, RelaySystemHandle};
pub use config::{ConfigManager, RelayConfig};
pub use error::{RelayError, Result};
pub use messaging::{BrokerClient, BrokerProvider, InMemoryBroker, RabbitMqBroker};
pub use models::{ChatMessage, MessageDraft, MessageId};
pub use relay::{ReconcileSummary, ReconcilerHandle, Relay, RelayStatsSnapshot};
pub use state_machine::DeliveryState;
pub use store::{MessageStore, StatusUpdate};
