//! Engine-wide counters.
//!
//! [`EngineMetrics`] is shared behind an `Arc` by the bus and the trust
//! engine; every counter is a relaxed atomic. [`MetricsSnapshot`] is the
//! serializable point-in-time view.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct EngineMetrics {
    signals_applied: AtomicU64,
    signals_rejected: AtomicU64,
    signals_dropped: AtomicU64,
    decay_sweeps: AtomicU64,
    decay_sweeps_skipped: AtomicU64,
    decay_failures: AtomicU64,
    subscriptions_granted: AtomicU64,
    subscriptions_denied: AtomicU64,
    events_delivered: AtomicU64,
    events_dropped: AtomicU64,
}

/// Point-in-time copy of [`EngineMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Signals whose score mutation committed.
    pub signals_applied: u64,
    /// Malformed signals rejected at ingestion.
    pub signals_rejected: u64,
    /// Valid signals abandoned after store retries were exhausted.
    pub signals_dropped: u64,
    pub decay_sweeps: u64,
    /// Ticks skipped because the previous sweep was still running.
    pub decay_sweeps_skipped: u64,
    /// Per-principal decay failures across all sweeps.
    pub decay_failures: u64,
    pub subscriptions_granted: u64,
    pub subscriptions_denied: u64,
    pub events_delivered: u64,
    /// Events discarded because a subscriber queue was full.
    pub events_dropped: u64,
}

macro_rules! counter {
    ($incr:ident, $field:ident) => {
        pub fn $incr(&self) {
            self.$field.fetch_add(1, Ordering::Relaxed);
        }
    };
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_signal_applied, signals_applied);
    counter!(record_signal_rejected, signals_rejected);
    counter!(record_signal_dropped, signals_dropped);
    counter!(record_decay_sweep, decay_sweeps);
    counter!(record_decay_sweep_skipped, decay_sweeps_skipped);
    counter!(record_subscription_granted, subscriptions_granted);
    counter!(record_subscription_denied, subscriptions_denied);
    counter!(record_event_dropped, events_dropped);

    pub fn record_decay_failures(&self, count: u64) {
        self.decay_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_events_delivered(&self, count: u64) {
        self.events_delivered.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            signals_applied: self.signals_applied.load(Ordering::Relaxed),
            signals_rejected: self.signals_rejected.load(Ordering::Relaxed),
            signals_dropped: self.signals_dropped.load(Ordering::Relaxed),
            decay_sweeps: self.decay_sweeps.load(Ordering::Relaxed),
            decay_sweeps_skipped: self.decay_sweeps_skipped.load(Ordering::Relaxed),
            decay_failures: self.decay_failures.load(Ordering::Relaxed),
            subscriptions_granted: self.subscriptions_granted.load(Ordering::Relaxed),
            subscriptions_denied: self.subscriptions_denied.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_dropped: self.events_dropped.load(Ordering::Relaxed),
        }
    }

    /// Serialize the current counters to JSON.
    pub fn snapshot_json(&self) -> serde_json::Value {
        serde_json::to_value(self.snapshot()).unwrap_or(serde_json::Value::Null)
    }
}
