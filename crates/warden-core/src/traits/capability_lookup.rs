use std::collections::BTreeSet;

use crate::models::PrincipalId;

/// Read-only view of the capabilities currently granted to principals.
///
/// Implementations must answer from a snapshot without touching trust state.
pub trait ICapabilityLookup: Send + Sync {
    fn capabilities(&self, principal_id: &PrincipalId) -> BTreeSet<String>;

    fn has_capability(&self, principal_id: &PrincipalId, tag: &str) -> bool {
        self.capabilities(principal_id).contains(tag)
    }
}
