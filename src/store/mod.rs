//! # Message Store Module
//!
//! In-process view of message delivery state shared by the publish path and
//! the reconcile loop.

pub mod message_store;

pub use message_store::{MessageStore, StatusUpdate};
