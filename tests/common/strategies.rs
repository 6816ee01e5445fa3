//! Proptest strategies for relay inputs.

use chat_relay::models::MessageDraft;
use chat_relay::state_machine::DeliveryState;
use proptest::prelude::*;

pub fn participant_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("alice".to_string()),
        Just("bob".to_string()),
        Just("carol".to_string()),
        Just("dave".to_string()),
    ]
}

/// Non-blank message text
pub fn content_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9 .,!?]{0,40}"
}

pub fn draft_strategy() -> impl Strategy<Value = MessageDraft> {
    (
        prop::option::of(participant_strategy()),
        prop::option::of(participant_strategy()),
        content_strategy(),
    )
        .prop_map(|(sender, recipient, content)| MessageDraft {
            sender,
            recipient,
            content,
        })
}

pub fn delivery_state_strategy() -> impl Strategy<Value = DeliveryState> {
    prop_oneof![
        Just(DeliveryState::Sent),
        Just(DeliveryState::Delivered),
        Just(DeliveryState::Read),
    ]
}
