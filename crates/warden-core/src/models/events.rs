use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventSource, PrincipalId, Signal};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityAction {
    Granted,
    Revoked,
}

/// A capability transition produced by reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityEvent {
    pub principal_id: PrincipalId,
    pub tag: String,
    pub action: CapabilityAction,
    pub at: DateTime<Utc>,
}

/// Published after every committed score mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreChanged {
    pub principal_id: PrincipalId,
    pub before: f64,
    pub after: f64,
    /// What caused the change, when the profile's newest log entry says so.
    pub source: Option<EventSource>,
    pub at: DateTime<Utc>,
}

/// Everything that travels over the signal bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BusEvent {
    Signal(Signal),
    ScoreChanged(ScoreChanged),
    Capability(CapabilityEvent),
    Telemetry {
        name: String,
        payload: serde_json::Value,
    },
}

impl BusEvent {
    /// Principal the event concerns, if any.
    pub fn principal(&self) -> Option<&PrincipalId> {
        match self {
            Self::Signal(s) => Some(&s.principal_id),
            Self::ScoreChanged(c) => Some(&c.principal_id),
            Self::Capability(c) => Some(&c.principal_id),
            Self::Telemetry { .. } => None,
        }
    }
}
