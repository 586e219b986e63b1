use chrono::{DateTime, Utc};

/// Malformed signals rejected at ingestion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("principal id is empty or longer than {max_len} bytes")]
    InvalidPrincipal { max_len: usize },

    #[error("magnitude {magnitude} is outside [-1.0, 1.0]")]
    InvalidMagnitude { magnitude: f64 },

    #[error("unknown signal kind: {kind}")]
    UnknownKind { kind: String },

    #[error("timestamp {timestamp} is outside the accepted range")]
    InvalidTimestamp { timestamp: DateTime<Utc> },
}
