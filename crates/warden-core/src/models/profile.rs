use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::PrincipalId;
use crate::constants::PROFILE_NAMESPACE;

/// What caused an event log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventSource {
    Signal { kind: String },
    Decay,
}

impl EventSource {
    pub fn signal(kind: impl Into<String>) -> Self {
        Self::Signal { kind: kind.into() }
    }

    /// Short label used in logs and metrics.
    pub fn label(&self) -> &str {
        match self {
            Self::Signal { kind } => kind,
            Self::Decay => "decay",
        }
    }
}

/// One applied score change. Kept for audit, never replayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub at: DateTime<Utc>,
    pub source: EventSource,
    pub delta: f64,
}

/// Reputation state of a single principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrustProfile {
    pub principal_id: PrincipalId,
    /// Always within `[0.0, 1.0]`.
    pub score: f64,
    /// `None` until the first signal or decay tick is applied.
    pub last_event_at: Option<DateTime<Utc>>,
    /// Derived from `score`; only the profile store writes it.
    pub capability_set: BTreeSet<String>,
    pub event_log: Vec<EventLogEntry>,
}

impl TrustProfile {
    /// A fresh profile at the baseline score with the capabilities that
    /// score qualifies for.
    pub fn baseline(
        principal_id: PrincipalId,
        baseline_score: f64,
        capability_set: BTreeSet<String>,
    ) -> Self {
        Self {
            principal_id,
            score: baseline_score,
            last_event_at: None,
            capability_set,
            event_log: Vec::new(),
        }
    }

    /// Store key under which this principal's profile lives.
    pub fn storage_key(principal_id: &PrincipalId) -> String {
        format!("{PROFILE_NAMESPACE}/{}", principal_id.0)
    }

    /// Inverse of [`TrustProfile::storage_key`].
    pub fn principal_from_key(key: &str) -> Option<PrincipalId> {
        key.strip_prefix(PROFILE_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|id| !id.is_empty())
            .map(PrincipalId::from)
    }

    pub fn has_capability(&self, tag: &str) -> bool {
        self.capability_set.contains(tag)
    }

    /// Append an entry and drop everything older than `horizon` relative to
    /// the newest entry, then cap the log at `max_entries`.
    pub fn record_event(&mut self, entry: EventLogEntry, horizon: Duration, max_entries: usize) {
        self.event_log.push(entry);
        self.prune_event_log(horizon, max_entries);
    }

    pub fn prune_event_log(&mut self, horizon: Duration, max_entries: usize) {
        let Some(newest) = self.event_log.iter().map(|e| e.at).max() else {
            return;
        };
        // A horizon reaching before the representable range keeps everything.
        if let Some(cutoff) = newest.checked_sub_signed(horizon) {
            self.event_log.retain(|e| e.at >= cutoff);
        }

        if self.event_log.len() > max_entries {
            let excess = self.event_log.len() - max_entries;
            self.event_log.drain(..excess);
        }
    }
}
