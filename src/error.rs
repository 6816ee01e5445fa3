//! # Relay Errors
//!
//! Caller-facing error kinds of the relay. Broker failures arrive as
//! [`MessagingError`] and are classified on conversion.

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::messaging::MessagingError;
use crate::models::ChatMessage;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Broker connection failed: {0}")]
    Connection(String),

    #[error("Broker channel failed: {0}")]
    Channel(String),

    #[error("Queue declaration failed: {0}")]
    Declare(String),

    #[error("Message encoding failed: {0}")]
    Encoding(String),

    /// The message is stored locally but never reached the broker
    #[error("Message {} stored but not delivered to broker: {source}", .message.id)]
    Delivery {
        message: Box<ChatMessage>,
        #[source]
        source: MessagingError,
    },

    #[error("Payload decoding failed: {0}")]
    Decoding(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Shutdown error: {0}")]
    Shutdown(String),
}

impl RelayError {
    pub fn delivery(message: ChatMessage, source: MessagingError) -> Self {
        Self::Delivery {
            message: Box::new(message),
            source,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Caused by the request rather than by the relay or the broker
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// The locally stored record carried by a delivery failure
    pub fn undelivered_message(&self) -> Option<&ChatMessage> {
        match self {
            Self::Delivery { message, .. } => Some(message),
            _ => None,
        }
    }
}

impl From<MessagingError> for RelayError {
    fn from(err: MessagingError) -> Self {
        match err {
            MessagingError::Connection { message } | MessagingError::HealthCheck { message } => {
                Self::Connection(message)
            }
            MessagingError::Channel { message } => Self::Channel(message),
            MessagingError::QueueDeclare { .. } | MessagingError::QueueNotFound { .. } => {
                Self::Declare(err.to_string())
            }
            MessagingError::MessageSerialization { message } => Self::Encoding(message),
            MessagingError::MessageDeserialization { message } => Self::Decoding(message),
            MessagingError::Configuration { .. } => Self::Configuration(err.to_string()),
            MessagingError::Send { .. }
            | MessagingError::Subscribe { .. }
            | MessagingError::AlreadySubscribed { .. }
            | MessagingError::Receive { .. } => Self::Channel(err.to_string()),
        }
    }
}

impl From<ConfigurationError> for RelayError {
    fn from(err: ConfigurationError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
