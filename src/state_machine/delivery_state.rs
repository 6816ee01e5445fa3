use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery progression of a chat message
///
/// Ordering is meaningful: `Sent < Delivered < Read`. The store only ever
/// moves a message forward along this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Published by the relay, broker confirmation not yet observed
    #[default]
    Sent,
    /// Observed coming back from the broker's inbound side
    #[serde(alias = "received")]
    Delivered,
    /// Marked read by a participant
    Read,
}

impl DeliveryState {
    /// Whether moving from `self` to `next` keeps the progression monotonic.
    ///
    /// Re-applying the current state is allowed (duplicate deliveries).
    pub fn can_advance_to(&self, next: DeliveryState) -> bool {
        next >= *self
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sent => write!(f, "sent"),
            Self::Delivered => write!(f, "delivered"),
            Self::Read => write!(f, "read"),
        }
    }
}

impl std::str::FromStr for DeliveryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(Self::Sent),
            "delivered" | "received" => Ok(Self::Delivered),
            "read" => Ok(Self::Read),
            _ => Err(format!("Invalid delivery state: {s}")),
        }
    }
}
