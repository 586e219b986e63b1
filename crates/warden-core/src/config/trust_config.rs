use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::constants::MAX_EVENT_LOG_HORIZON_SECS;
use crate::errors::ConfigError;

/// Scoring, capability, and profile-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustConfig {
    /// Score assigned to a principal with no history. Decay pulls toward it.
    pub baseline_score: f64,
    /// Signal kind → weight multiplier. Kinds absent here are rejected.
    pub kind_weight_table: BTreeMap<String, f64>,
    /// Capability tag → minimum score required to hold it.
    pub capability_thresholds: BTreeMap<String, f64>,
    /// Event log entries older than this (relative to the newest) are pruned.
    pub event_log_horizon_secs: u64,
    /// Hard cap on event log length per profile.
    pub event_log_max_entries: usize,
    /// How long an update waits for its principal's lock.
    pub lock_timeout_ms: u64,
    /// Store retries before an update is abandoned.
    pub store_max_retries: u32,
    /// Initial retry backoff; doubles per attempt.
    pub store_retry_backoff_ms: u64,
    /// Bus ingestion workers. Signals are sharded across them by principal.
    pub ingestion_workers: usize,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            baseline_score: defaults::DEFAULT_BASELINE_SCORE,
            kind_weight_table: defaults::DEFAULT_KIND_WEIGHTS
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect(),
            capability_thresholds: defaults::DEFAULT_CAPABILITY_THRESHOLDS
                .iter()
                .map(|(t, s)| (t.to_string(), *s))
                .collect(),
            event_log_horizon_secs: defaults::DEFAULT_EVENT_LOG_HORIZON_SECS,
            event_log_max_entries: defaults::DEFAULT_EVENT_LOG_MAX_ENTRIES,
            lock_timeout_ms: defaults::DEFAULT_LOCK_TIMEOUT_MS,
            store_max_retries: defaults::DEFAULT_STORE_MAX_RETRIES,
            store_retry_backoff_ms: defaults::DEFAULT_STORE_RETRY_BACKOFF_MS,
            ingestion_workers: defaults::DEFAULT_INGESTION_WORKERS,
        }
    }
}

impl TrustConfig {
    pub fn event_log_horizon(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.event_log_horizon_secs.min(i64::MAX as u64 / 1000) as i64)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn store_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.store_retry_backoff_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.baseline_score) {
            return Err(ConfigError::Invalid {
                field: "trust.baseline_score".to_string(),
                reason: format!("{} is outside [0.0, 1.0]", self.baseline_score),
            });
        }
        for (kind, weight) in &self.kind_weight_table {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(ConfigError::Invalid {
                    field: format!("trust.kind_weight_table.{kind}"),
                    reason: format!("weight {weight} must be finite and non-negative"),
                });
            }
        }
        for (tag, min_score) in &self.capability_thresholds {
            if !(0.0..=1.0).contains(min_score) {
                return Err(ConfigError::Invalid {
                    field: format!("trust.capability_thresholds.{tag}"),
                    reason: format!("{min_score} is outside [0.0, 1.0]"),
                });
            }
        }
        if self.event_log_horizon_secs > MAX_EVENT_LOG_HORIZON_SECS {
            return Err(ConfigError::Invalid {
                field: "trust.event_log_horizon_secs".to_string(),
                reason: format!(
                    "{} exceeds the maximum of {MAX_EVENT_LOG_HORIZON_SECS}",
                    self.event_log_horizon_secs
                ),
            });
        }
        if self.event_log_max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "trust.event_log_max_entries".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.ingestion_workers == 0 {
            return Err(ConfigError::Invalid {
                field: "trust.ingestion_workers".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "trust.lock_timeout_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
