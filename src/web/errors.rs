//! # Web API Error Types
//!
//! HTTP-facing errors rendered as `{"error": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::RelayError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        if err.is_client_error() {
            return match err {
                RelayError::Validation(message) => Self::bad_request(message),
                other => Self::bad_request(other.to_string()),
            };
        }

        error!(error = %err, "Relay operation failed");
        match err {
            RelayError::Delivery { .. } | RelayError::Encoding(_) => {
                Self::internal("Failed to send message")
            }
            _ => Self::internal("Internal server error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::MessagingError;
    use crate::models::{MessageDraft, MessageId};
    use chrono::Utc;

    #[test]
    fn test_relay_error_mapping() {
        let err = ApiError::from(RelayError::validation("Content cannot be empty"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Content cannot be empty");

        let message = MessageDraft::direct("alice", "bob", "hi").into_message(MessageId::FIRST, Utc::now());
        let err = ApiError::from(RelayError::delivery(
            message,
            MessagingError::send("chat_messages", "down"),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to send message");
    }

    #[test]
    fn test_unauthorized_status() {
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
    }
}
