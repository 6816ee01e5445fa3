//! # Messaging Error Types
//!
//! Structured broker-side failures. Each variant maps onto one of the relay's
//! error kinds (connection, channel, declare, send, decode).

use thiserror::Error;

/// Broker client error types
#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Broker connection error: {message}")]
    Connection { message: String },

    #[error("Broker channel error: {message}")]
    Channel { message: String },

    #[error("Queue declare failed: {queue_name}: {message}")]
    QueueDeclare { queue_name: String, message: String },

    #[error("Queue not found: {queue_name}")]
    QueueNotFound { queue_name: String },

    #[error("Send to queue failed: {queue_name}: {message}")]
    Send { queue_name: String, message: String },

    #[error("Subscribe to queue failed: {queue_name}: {message}")]
    Subscribe { queue_name: String, message: String },

    #[error("Queue {queue_name} already has an active subscriber")]
    AlreadySubscribed { queue_name: String },

    #[error("Receive from queue failed: {queue_name}: {message}")]
    Receive { queue_name: String, message: String },

    #[error("Message serialization error: {message}")]
    MessageSerialization { message: String },

    #[error("Message deserialization error: {message}")]
    MessageDeserialization { message: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },

    #[error("Broker health check failed: {message}")]
    HealthCheck { message: String },
}

impl MessagingError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a channel error
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// Create a queue declare error
    pub fn queue_declare(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueueDeclare {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create a queue not found error
    pub fn queue_not_found(queue_name: impl Into<String>) -> Self {
        Self::QueueNotFound {
            queue_name: queue_name.into(),
        }
    }

    /// Create a send error
    pub fn send(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Send {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create a subscribe error
    pub fn subscribe(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Subscribe {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create an already-subscribed error
    pub fn already_subscribed(queue_name: impl Into<String>) -> Self {
        Self::AlreadySubscribed {
            queue_name: queue_name.into(),
        }
    }

    /// Create a receive error
    pub fn receive(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Receive {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create a message serialization error
    pub fn message_serialization(message: impl Into<String>) -> Self {
        Self::MessageSerialization {
            message: message.into(),
        }
    }

    /// Create a message deserialization error
    pub fn message_deserialization(message: impl Into<String>) -> Self {
        Self::MessageDeserialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a health check error
    pub fn health_check(message: impl Into<String>) -> Self {
        Self::HealthCheck {
            message: message.into(),
        }
    }

    /// Whether the failure happened while turning bytes into a message
    pub fn is_decode_failure(&self) -> bool {
        matches!(self, Self::MessageDeserialization { .. })
    }
}

/// Conversion from serde_json::Error to MessagingError
impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            MessagingError::message_deserialization(err.to_string())
        } else {
            MessagingError::message_serialization(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messaging_error_creation() {
        let conn_err = MessagingError::connection("refused");
        assert!(matches!(conn_err, MessagingError::Connection { .. }));

        let send_err = MessagingError::send("chat_messages", "channel closed");
        assert!(matches!(send_err, MessagingError::Send { .. }));

        let declare_err = MessagingError::queue_declare("chat_messages", "access refused");
        assert!(matches!(declare_err, MessagingError::QueueDeclare { .. }));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json").unwrap_err();
        let messaging_err: MessagingError = json_err.into();
        assert!(messaging_err.is_decode_failure());
    }

    #[test]
    fn test_error_display() {
        let err = MessagingError::send("chat_messages", "Publish failed");
        let display_str = format!("{err}");
        assert!(display_str.contains("Send to queue failed"));
        assert!(display_str.contains("chat_messages"));
        assert!(display_str.contains("Publish failed"));
    }
}
