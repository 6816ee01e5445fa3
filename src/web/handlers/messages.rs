//! # Message Handlers
//!
//! Session-scoped operations: send, list, mark read, delete. Every listing
//! response is the caller's own view of the store.

use axum::extract::{Path, State};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::models::{ChatMessage, MessageDraft, MessageId};
use crate::web::errors::ApiError;
use crate::web::extractors::AuthenticatedUser;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageForm {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub to: Option<String>,
}

fn parse_message_id(raw: &str) -> Result<MessageId, ApiError> {
    raw.parse().map_err(|_| ApiError::bad_request("Invalid ID"))
}

/// Send a message: POST /send
pub async fn send_message(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Form(form): Form<SendMessageForm>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    if form.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content cannot be empty"));
    }

    let recipient = form
        .to
        .map(|to| to.trim().to_string())
        .filter(|to| !to.is_empty())
        .or_else(|| state.default_recipient(&user));

    let draft = MessageDraft {
        sender: Some(user.clone()),
        recipient,
        content: form.content,
    };

    let message = state.relay.publish(draft).await?;
    debug!(message_id = %message.id, user = %user, "Message sent");

    Ok(Json(state.relay.list_for(&user)))
}

/// List the caller's messages: GET /messages
pub async fn list_messages(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<Vec<ChatMessage>> {
    Json(state.relay.list_for(&user))
}

/// Mark a message read: POST /mark-read/:id
///
/// Unknown ids are a no-op.
pub async fn mark_read(
    State(state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_message_id(&raw_id)?;
    let outcome = state.relay.mark_read(id);
    debug!(message_id = %id, outcome = ?outcome, "Mark read");
    Ok(Json(json!({ "status": "ok" })))
}

/// Delete a message: POST /delete/:id
pub async fn delete_message(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(raw_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let id = parse_message_id(&raw_id)?;
    state.relay.delete(id);
    Ok(Json(state.relay.list_for(&user)))
}
