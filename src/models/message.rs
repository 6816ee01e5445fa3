//! # Chat Message Model
//!
//! The single entity relayed through the broker. The same struct is the
//! in-store record and the wire record; field names on the wire are stable
//! (`id`, `from`, `to`, `content`, `timestamp`, `status`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::state_machine::DeliveryState;

/// Store-assigned message identifier, monotonically increasing from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    /// First identifier handed out by an empty store
    pub const FIRST: MessageId = MessageId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MessageId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Caller intent for a new message, before the store assigns identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub content: String,
}

impl MessageDraft {
    /// Message between two named participants
    pub fn direct(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            sender: Some(sender.into()),
            recipient: Some(recipient.into()),
            content: content.into(),
        }
    }

    /// Message from a named participant to everyone
    pub fn broadcast(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            recipient: None,
            content: content.into(),
        }
    }

    /// Single-queue message with no participant identity at all
    pub fn anonymous(content: impl Into<String>) -> Self {
        Self {
            sender: None,
            recipient: None,
            content: content.into(),
        }
    }

    /// Materialize into a stored message in the `sent` state
    pub fn into_message(self, id: MessageId, timestamp: DateTime<Utc>) -> ChatMessage {
        ChatMessage {
            id,
            sender: self.sender,
            recipient: self.recipient,
            content: self.content,
            timestamp,
            status: DeliveryState::Sent,
        }
    }
}

/// A relayed chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(
        rename = "from",
        alias = "sender",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sender: Option<String>,
    #[serde(
        rename = "to",
        alias = "recipient",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recipient: Option<String>,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub status: DeliveryState,
}

impl ChatMessage {
    /// A message without a recipient is visible to every participant
    pub fn is_broadcast(&self) -> bool {
        self.recipient.is_none()
    }

    /// Whether `participant` sent or receives this message
    pub fn involves(&self, participant: &str) -> bool {
        self.is_broadcast()
            || self.sender.as_deref() == Some(participant)
            || self.recipient.as_deref() == Some(participant)
    }
}
