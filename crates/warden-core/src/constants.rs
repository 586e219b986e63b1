/// Store namespace holding serialized trust profiles.
pub const PROFILE_NAMESPACE: &str = "trust_profile";

/// Lower bound of every trust score.
pub const MIN_SCORE: f64 = 0.0;

/// Upper bound of every trust score.
pub const MAX_SCORE: f64 = 1.0;

/// Largest absolute signal magnitude accepted at ingestion.
pub const MAX_SIGNAL_MAGNITUDE: f64 = 1.0;

/// Maximum length of a principal identifier.
pub const MAX_PRINCIPAL_ID_LEN: usize = 256;

/// Earliest accepted signal timestamp, in Unix seconds (1970-01-01T00:00:00Z).
pub const MIN_SIGNAL_TIMESTAMP_SECS: i64 = 0;

/// Latest accepted signal timestamp, in Unix seconds (9999-12-31T23:59:59Z).
pub const MAX_SIGNAL_TIMESTAMP_SECS: i64 = 253_402_300_799;

/// Longest event log retention horizon a configuration may ask for (100 years).
pub const MAX_EVENT_LOG_HORIZON_SECS: u64 = 100 * 365 * 86_400;
