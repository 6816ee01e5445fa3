//! # Wire Codec
//!
//! Serialization contract for anything that travels through the broker.

use super::errors::MessagingError;

/// Message serialization contract
///
/// JSON via serde is the only encoding today; the trait keeps the relay
/// independent of it.
pub trait QueueMessage: Send + Sync + Clone + 'static {
    /// Serialize the message to bytes
    fn to_bytes(&self) -> Result<Vec<u8>, MessagingError>;

    /// Deserialize the message from bytes
    fn from_bytes(bytes: &[u8]) -> Result<Self, MessagingError>
    where
        Self: Sized;
}

/// JSON encoding for any serde-compatible type
impl<T> QueueMessage for T
where
    T: serde::Serialize + serde::de::DeserializeOwned + Send + Sync + Clone + 'static,
{
    fn to_bytes(&self) -> Result<Vec<u8>, MessagingError> {
        serde_json::to_vec(self).map_err(|e| MessagingError::message_serialization(e.to_string()))
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, MessagingError> {
        serde_json::from_slice(bytes)
            .map_err(|e| MessagingError::message_deserialization(e.to_string()))
    }
}
