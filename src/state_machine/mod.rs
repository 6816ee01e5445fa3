// Delivery state machine for relayed chat messages
//
// sent -> delivered -> read, never backward. Deletion is modeled as absence
// from the store rather than as a state.

pub mod delivery_state;

pub use delivery_state::DeliveryState;
