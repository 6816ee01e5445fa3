//! Shared application state for the HTTP layer.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::relay::Relay;

#[derive(Debug, Clone)]
pub struct AppState {
    pub relay: Relay,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(relay: Relay, config: Arc<RelayConfig>) -> Self {
        Self { relay, config }
    }

    /// Default recipient for a message from `sender` that names none
    pub fn default_recipient(&self, sender: &str) -> Option<String> {
        self.config.counterpart_of(sender).map(str::to_string)
    }
}
