use std::collections::BTreeSet;

use dashmap::DashMap;

use warden_core::models::PrincipalId;
use warden_core::traits::ICapabilityLookup;

/// Last committed capability set per principal.
///
/// Written only by the profile store after a commit; read by the
/// capability authorizer without touching trust state.
#[derive(Debug)]
pub struct CapabilitySnapshot {
    granted: DashMap<PrincipalId, BTreeSet<String>>,
    baseline: BTreeSet<String>,
}

impl CapabilitySnapshot {
    /// `baseline` is served for principals with no committed profile.
    pub fn new(baseline: BTreeSet<String>) -> Self {
        Self {
            granted: DashMap::new(),
            baseline,
        }
    }

    pub(crate) fn set(&self, principal_id: &PrincipalId, capabilities: BTreeSet<String>) {
        self.granted.insert(principal_id.clone(), capabilities);
    }

    pub(crate) fn remove(&self, principal_id: &PrincipalId) {
        self.granted.remove(principal_id);
    }

    pub fn len(&self) -> usize {
        self.granted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.is_empty()
    }
}

impl ICapabilityLookup for CapabilitySnapshot {
    fn capabilities(&self, principal_id: &PrincipalId) -> BTreeSet<String> {
        self.granted
            .get(principal_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| self.baseline.clone())
    }

    fn has_capability(&self, principal_id: &PrincipalId, tag: &str) -> bool {
        match self.granted.get(principal_id) {
            Some(entry) => entry.value().contains(tag),
            None => self.baseline.contains(tag),
        }
    }
}
