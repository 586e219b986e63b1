use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use warden_core::models::{CapabilityAction, CapabilityEvent, PrincipalId, TrustProfile};

/// Difference between a profile's granted capabilities and what its score earns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Tags newly earned, in tag order.
    pub granted: Vec<String>,
    /// Tags no longer earned, in tag order.
    pub revoked: Vec<String>,
    /// The capability set the profile holds once reconciled.
    pub settled: BTreeSet<String>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

/// Maps scores to capability sets under a fixed threshold table.
#[derive(Debug, Clone)]
pub struct CapabilitySynchronizer {
    thresholds: BTreeMap<String, f64>,
}

impl CapabilitySynchronizer {
    pub fn new(thresholds: BTreeMap<String, f64>) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &BTreeMap<String, f64> {
        &self.thresholds
    }

    /// Every tag whose minimum score `score` meets.
    pub fn derive(&self, score: f64) -> BTreeSet<String> {
        self.thresholds
            .iter()
            .filter(|(_, min_score)| score >= **min_score)
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    /// Compare what `next` earns against what `current` holds.
    ///
    /// `next.capability_set` is ignored; callers cannot grant tags directly.
    pub fn reconcile(&self, current: &TrustProfile, next: &TrustProfile) -> Reconciliation {
        let settled = self.derive(next.score);
        let granted = settled
            .difference(&current.capability_set)
            .cloned()
            .collect();
        let revoked = current
            .capability_set
            .difference(&settled)
            .cloned()
            .collect();
        Reconciliation {
            granted,
            revoked,
            settled,
        }
    }

    /// Grant events first, then revocations, each in tag order.
    pub fn events(
        &self,
        principal_id: &PrincipalId,
        reconciliation: &Reconciliation,
        at: DateTime<Utc>,
    ) -> Vec<CapabilityEvent> {
        let granted = reconciliation
            .granted
            .iter()
            .map(|tag| (tag, CapabilityAction::Granted));
        let revoked = reconciliation
            .revoked
            .iter()
            .map(|tag| (tag, CapabilityAction::Revoked));
        granted
            .chain(revoked)
            .map(|(tag, action)| CapabilityEvent {
                principal_id: principal_id.clone(),
                tag: tag.clone(),
                action,
                at,
            })
            .collect()
    }
}
