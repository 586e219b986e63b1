//! Domain models shared by every Warden crate.

pub mod events;
pub mod principal;
pub mod profile;
pub mod signal;
pub mod topic;

pub use events::{BusEvent, CapabilityAction, CapabilityEvent, ScoreChanged};
pub use principal::PrincipalId;
pub use profile::{EventLogEntry, EventSource, TrustProfile};
pub use signal::{signal_kinds, Signal};
pub use topic::Topic;
