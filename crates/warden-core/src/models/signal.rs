use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PrincipalId;

/// Well-known signal kinds present in the default weight table.
pub mod signal_kinds {
    pub const VIOLATION: &str = "violation";
    pub const POLICY_BREACH: &str = "policy_breach";
    pub const ENDORSEMENT: &str = "endorsement";
    pub const TASK_SUCCESS: &str = "task_success";
    pub const TASK_FAILURE: &str = "task_failure";
}

/// A behavioral observation about a principal.
///
/// `magnitude` is signed: negative values lower the score, positive values
/// raise it. The kind's configured weight scales it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub principal_id: PrincipalId,
    pub kind: String,
    pub magnitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    pub fn new(
        principal_id: impl Into<PrincipalId>,
        kind: impl Into<String>,
        magnitude: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            kind: kind.into(),
            magnitude,
            timestamp,
        }
    }
}
