mod common;

use chat_relay::messaging::QueueMessage;
use chat_relay::models::{ChatMessage, MessageId};
use chat_relay::state_machine::DeliveryState;
use chat_relay::store::MessageStore;
use common::strategies::*;
use proptest::prelude::*;

proptest! {
    /// Property: ids are strictly increasing, starting at 1, with no gaps
    #[test]
    fn inserted_ids_strictly_increase(drafts in prop::collection::vec(draft_strategy(), 1..40)) {
        let store = MessageStore::new();
        let ids: Vec<u64> = drafts
            .into_iter()
            .map(|draft| store.insert(draft).id.value())
            .collect();

        prop_assert_eq!(ids[0], 1);
        prop_assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    }

    /// Property: whatever sequence of status requests arrives, a message's
    /// state only moves forward and ends at the maximum requested
    #[test]
    fn delivery_state_never_regresses(requests in prop::collection::vec(delivery_state_strategy(), 0..20)) {
        let store = MessageStore::new();
        let id = store.insert(chat_relay::models::MessageDraft::direct("alice", "bob", "x")).id;

        let mut previous = DeliveryState::Sent;
        for requested in &requests {
            store.update_status(id, *requested);
            let current = store.get(id).unwrap().status;
            prop_assert!(current >= previous, "{} regressed to {}", previous, current);
            previous = current;
        }

        let expected = requests.iter().copied().max().unwrap_or(DeliveryState::Sent).max(DeliveryState::Sent);
        prop_assert_eq!(previous, expected);
    }

    /// Property: list_for returns exactly the messages involving the
    /// participant, in insertion order
    #[test]
    fn list_for_is_filtered_and_ordered(
        drafts in prop::collection::vec(draft_strategy(), 0..30),
        participant in participant_strategy(),
    ) {
        let store = MessageStore::new();
        let inserted: Vec<ChatMessage> = drafts.into_iter().map(|d| store.insert(d)).collect();

        let expected: Vec<MessageId> = inserted
            .iter()
            .filter(|m| m.involves(&participant))
            .map(|m| m.id)
            .collect();
        let listed: Vec<MessageId> = store.list_for(&participant).iter().map(|m| m.id).collect();

        prop_assert_eq!(listed, expected);
    }

    /// Property: whatever the relay publishes decodes back to the same record
    #[test]
    fn stored_messages_decode_from_their_wire_form(draft in draft_strategy()) {
        let store = MessageStore::new();
        let (message, payload) = store.try_insert(draft, |m| m.to_bytes()).unwrap();
        let decoded = ChatMessage::from_bytes(&payload).unwrap();
        prop_assert_eq!(decoded, message);
    }

    /// Property: arbitrary bytes never panic the decoder
    #[test]
    fn decoder_rejects_garbage_without_panicking(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = ChatMessage::from_bytes(&bytes);
    }
}
