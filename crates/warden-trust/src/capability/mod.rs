//! Capability derivation and the committed-capability snapshot.

mod snapshot;
mod synchronizer;

pub use snapshot::CapabilitySnapshot;
pub use synchronizer::{CapabilitySynchronizer, Reconciliation};
