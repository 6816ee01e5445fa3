//! # Message Store
//!
//! Single source of truth for every message the relay knows about. The
//! publish path and the reconcile loop both mutate it, so every operation
//! runs under one `parking_lot::Mutex` that also guards the id counter.
//! Callers only ever receive copies.

use std::collections::BTreeMap;

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::models::{ChatMessage, MessageDraft, MessageId};
use crate::state_machine::DeliveryState;

/// Outcome of a status change request
///
/// Every variant is a success: an unknown id or a stale request is
/// "nothing to do", since the reconcile path races deletes and duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StatusUpdate {
    /// The message moved forward
    Applied {
        from: DeliveryState,
        to: DeliveryState,
    },
    /// The requested state was already the current state
    Unchanged { state: DeliveryState },
    /// The request would have moved the message backward and was ignored
    Stale {
        current: DeliveryState,
        requested: DeliveryState,
    },
    /// No message with that id exists (never stored, or deleted)
    NotFound,
}

impl StatusUpdate {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// State of the message after the request, if it still exists
    pub fn resulting_state(&self) -> Option<DeliveryState> {
        match self {
            Self::Applied { to, .. } => Some(*to),
            Self::Unchanged { state } => Some(*state),
            Self::Stale { current, .. } => Some(*current),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug)]
struct StoreInner {
    /// Keyed by id; ids are issued in insertion order so iteration order is
    /// insertion order
    messages: BTreeMap<MessageId, ChatMessage>,
    next_id: MessageId,
}

/// In-memory message collection safe for concurrent use
#[derive(Debug)]
pub struct MessageStore {
    inner: Mutex<StoreInner>,
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                messages: BTreeMap::new(),
                next_id: MessageId::FIRST,
            }),
        }
    }

    /// Store a draft in the `sent` state and return the stored copy
    pub fn insert(&self, draft: MessageDraft) -> ChatMessage {
        match self.try_insert(draft, |_| Ok::<_, std::convert::Infallible>(())) {
            Ok((message, ())) => message,
            Err(never) => match never {},
        }
    }

    /// Assign the next id, build the message and run `encode` on it while
    /// holding the lock.
    ///
    /// If `encode` fails nothing is stored and the id is not consumed, so a
    /// message is either fully recorded (with its wire form) or not at all.
    pub fn try_insert<T, E, F>(&self, draft: MessageDraft, encode: F) -> Result<(ChatMessage, T), E>
    where
        F: FnOnce(&ChatMessage) -> Result<T, E>,
    {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        let message = draft.into_message(id, Utc::now());

        let encoded = encode(&message)?;

        inner.next_id = id.next();
        inner.messages.insert(id, message.clone());

        debug!(message_id = %id, "Message stored in sent state");
        Ok((message, encoded))
    }

    /// Move a message forward to `new_state`; never backward
    pub fn update_status(&self, id: MessageId, new_state: DeliveryState) -> StatusUpdate {
        let mut inner = self.inner.lock();
        let Some(message) = inner.messages.get_mut(&id) else {
            trace!(message_id = %id, requested = %new_state, "Status update for unknown message ignored");
            return StatusUpdate::NotFound;
        };

        let current = message.status;
        if current == new_state {
            StatusUpdate::Unchanged { state: current }
        } else if current.can_advance_to(new_state) {
            message.status = new_state;
            debug!(message_id = %id, from = %current, to = %new_state, "Message status advanced");
            StatusUpdate::Applied {
                from: current,
                to: new_state,
            }
        } else {
            trace!(message_id = %id, current = %current, requested = %new_state, "Refusing status regression");
            StatusUpdate::Stale {
                current,
                requested: new_state,
            }
        }
    }

    /// Transition a message to `read` from `sent` or `delivered`
    pub fn mark_read(&self, id: MessageId) -> StatusUpdate {
        self.update_status(id, DeliveryState::Read)
    }

    /// Remove a message permanently. Returns whether anything was removed.
    pub fn delete(&self, id: MessageId) -> bool {
        let removed = self.inner.lock().messages.remove(&id).is_some();
        if removed {
            debug!(message_id = %id, "Message deleted");
        }
        removed
    }

    /// Copy of a single message
    pub fn get(&self, id: MessageId) -> Option<ChatMessage> {
        self.inner.lock().messages.get(&id).cloned()
    }

    /// Snapshot of every message `participant` sent or receives (broadcasts
    /// included), in insertion order
    pub fn list_for(&self, participant: &str) -> Vec<ChatMessage> {
        self.inner
            .lock()
            .messages
            .values()
            .filter(|message| message.involves(participant))
            .cloned()
            .collect()
    }

    /// Snapshot of all messages in insertion order
    pub fn list_all(&self) -> Vec<ChatMessage> {
        self.inner.lock().messages.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_insert_assigns_increasing_ids() {
        let store = MessageStore::new();

        let first = store.insert(MessageDraft::direct("alice", "bob", "one"));
        let second = store.insert(MessageDraft::direct("bob", "alice", "two"));

        assert_eq!(first.id, MessageId::new(1));
        assert_eq!(second.id, MessageId::new(2));
        assert_eq!(first.status, DeliveryState::Sent);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_failed_encode_stores_nothing_and_keeps_counter() {
        let store = MessageStore::new();

        let result: Result<(ChatMessage, ()), String> = store
            .try_insert(MessageDraft::anonymous("boom"), |_| Err("encode failed".to_string()));
        assert!(result.is_err());
        assert!(store.is_empty());

        let stored = store.insert(MessageDraft::anonymous("ok"));
        assert_eq!(stored.id, MessageId::FIRST);
    }

    #[test]
    fn test_update_status_is_monotonic() {
        let store = MessageStore::new();
        let id = store.insert(MessageDraft::direct("alice", "bob", "hi")).id;

        assert_eq!(
            store.update_status(id, DeliveryState::Delivered),
            StatusUpdate::Applied {
                from: DeliveryState::Sent,
                to: DeliveryState::Delivered
            }
        );
        assert_eq!(
            store.update_status(id, DeliveryState::Delivered),
            StatusUpdate::Unchanged {
                state: DeliveryState::Delivered
            }
        );
        assert_eq!(
            store.update_status(id, DeliveryState::Sent),
            StatusUpdate::Stale {
                current: DeliveryState::Delivered,
                requested: DeliveryState::Sent
            }
        );
        assert_eq!(store.get(id).unwrap().status, DeliveryState::Delivered);
    }

    #[test]
    fn test_mark_read_from_sent_and_idempotent() {
        let store = MessageStore::new();
        let id = store.insert(MessageDraft::direct("alice", "bob", "hi")).id;

        assert!(store.mark_read(id).is_applied());
        assert_eq!(
            store.mark_read(id),
            StatusUpdate::Unchanged {
                state: DeliveryState::Read
            }
        );
        // A late delivery confirmation cannot pull a read message back
        assert_eq!(
            store.update_status(id, DeliveryState::Delivered).resulting_state(),
            Some(DeliveryState::Read)
        );
    }

    #[test]
    fn test_unknown_ids_are_no_ops() {
        let store = MessageStore::new();
        let missing = MessageId::new(99);

        assert!(store.mark_read(missing).is_not_found());
        assert!(store.update_status(missing, DeliveryState::Delivered).is_not_found());
        assert!(!store.delete(missing));
    }

    #[test]
    fn test_delete_then_late_update_does_not_resurrect() {
        let store = MessageStore::new();
        let id = store.insert(MessageDraft::direct("alice", "bob", "hi")).id;

        assert!(store.delete(id));
        assert!(store.update_status(id, DeliveryState::Delivered).is_not_found());
        assert!(store.get(id).is_none());
        assert!(store.list_for("alice").is_empty());
    }

    #[test]
    fn test_list_for_filters_by_participant_in_order() {
        let store = MessageStore::new();
        let a1 = store.insert(MessageDraft::direct("p", "q", "a1"));
        store.insert(MessageDraft::direct("r", "s", "b"));
        let a2 = store.insert(MessageDraft::direct("q", "p", "a2"));

        let listed: Vec<MessageId> = store.list_for("p").iter().map(|m| m.id).collect();
        assert_eq!(listed, vec![a1.id, a2.id]);
        assert_eq!(store.list_all().len(), 3);
    }

    #[test]
    fn test_list_for_includes_broadcasts() {
        let store = MessageStore::new();
        store.insert(MessageDraft::broadcast("alice", "hello everyone"));
        store.insert(MessageDraft::direct("carol", "dave", "private"));

        let for_bob = store.list_for("bob");
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_bob[0].content, "hello everyone");
    }

    #[test]
    fn test_concurrent_inserts_never_duplicate_ids() {
        let store = Arc::new(MessageStore::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    (0..250)
                        .map(|i| {
                            store
                                .insert(MessageDraft::direct(
                                    format!("w{worker}"),
                                    "sink",
                                    format!("m{i}"),
                                ))
                                .id
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<MessageId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 2000);
        assert_eq!(ids.first(), Some(&MessageId::new(1)));
        assert_eq!(ids.last(), Some(&MessageId::new(2000)));
    }
}
