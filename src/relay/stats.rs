//! Relay counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Lock-free counters updated on the publish and reconcile paths
#[derive(Debug, Default)]
pub struct RelayStats {
    published: AtomicU64,
    publish_failures: AtomicU64,
    reconciled: AtomicU64,
    decode_failures: AtomicU64,
    reconcile_not_found: AtomicU64,
}

impl RelayStats {
    pub fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconciled(&self) {
        self.reconciled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconcile_not_found(&self) {
        self.reconcile_not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, stored_messages: usize) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            reconciled: self.reconciled.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            reconcile_not_found: self.reconcile_not_found.load(Ordering::Relaxed),
            stored_messages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    pub published: u64,
    pub publish_failures: u64,
    pub reconciled: u64,
    pub decode_failures: u64,
    pub reconcile_not_found: u64,
    pub stored_messages: usize,
}
