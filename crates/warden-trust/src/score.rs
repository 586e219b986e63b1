//! ScoreEngine: the arithmetic of trust.
//!
//! Signal: `next = clamp(score + magnitude × weight(kind), 0, 1)`
//!
//! Decay: `next = baseline + (score - baseline) × 2^(-elapsed / half_life)`
//!
//! Both paths are total. Validation happens up front in [`ScoreEngine::validate`];
//! once a signal has passed it, applying it cannot fail.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use warden_core::config::{DecayConfig, TrustConfig};
use warden_core::constants::{
    MAX_PRINCIPAL_ID_LEN, MAX_SCORE, MAX_SIGNAL_MAGNITUDE, MAX_SIGNAL_TIMESTAMP_SECS, MIN_SCORE,
    MIN_SIGNAL_TIMESTAMP_SECS,
};
use warden_core::errors::SignalError;
use warden_core::models::{EventLogEntry, EventSource, Signal, TrustProfile};

use crate::decay::formula;

/// Computes next scores from signals and elapsed time.
#[derive(Debug, Clone)]
pub struct ScoreEngine {
    baseline: f64,
    kind_weights: BTreeMap<String, f64>,
    half_life: Duration,
    event_log_horizon: Duration,
    event_log_max_entries: usize,
}

impl ScoreEngine {
    pub fn new(trust: &TrustConfig, decay: &DecayConfig) -> Self {
        Self {
            baseline: trust.baseline_score,
            kind_weights: trust.kind_weight_table.clone(),
            half_life: decay.half_life(),
            event_log_horizon: trust.event_log_horizon(),
            event_log_max_entries: trust.event_log_max_entries,
        }
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn half_life(&self) -> Duration {
        self.half_life
    }

    /// Weight multiplier for `kind`, if the kind is known.
    pub fn kind_weight(&self, kind: &str) -> Option<f64> {
        self.kind_weights.get(kind).copied()
    }

    /// Reject signals the engine cannot apply.
    pub fn validate(&self, signal: &Signal) -> Result<(), SignalError> {
        let id = signal.principal_id.as_str();
        if id.is_empty() || id.len() > MAX_PRINCIPAL_ID_LEN {
            return Err(SignalError::InvalidPrincipal {
                max_len: MAX_PRINCIPAL_ID_LEN,
            });
        }
        if !signal.magnitude.is_finite() || signal.magnitude.abs() > MAX_SIGNAL_MAGNITUDE {
            return Err(SignalError::InvalidMagnitude {
                magnitude: signal.magnitude,
            });
        }
        if !self.kind_weights.contains_key(&signal.kind) {
            return Err(SignalError::UnknownKind {
                kind: signal.kind.clone(),
            });
        }
        let secs = signal.timestamp.timestamp();
        if !(MIN_SIGNAL_TIMESTAMP_SECS..=MAX_SIGNAL_TIMESTAMP_SECS).contains(&secs) {
            return Err(SignalError::InvalidTimestamp {
                timestamp: signal.timestamp,
            });
        }
        Ok(())
    }

    /// Score after applying `signal` to `profile`.
    ///
    /// An unknown kind weighs nothing; a non-finite magnitude leaves the score as is.
    ///
    /// ```
    /// use chrono::Utc;
    /// use warden_core::config::WardenConfig;
    /// use warden_core::models::{PrincipalId, Signal, TrustProfile};
    /// use warden_trust::ScoreEngine;
    ///
    /// let config = WardenConfig::default();
    /// let engine = ScoreEngine::new(&config.trust, &config.decay);
    /// let profile = TrustProfile::baseline(PrincipalId::from("agent-7"), 0.5, Default::default());
    ///
    /// let next = engine.apply_signal(&profile, &Signal::new("agent-7", "violation", -0.3, Utc::now()));
    /// assert!((next - 0.2).abs() < 1e-9);
    /// ```
    pub fn apply_signal(&self, profile: &TrustProfile, signal: &Signal) -> f64 {
        let delta = signal.magnitude * self.kind_weight(&signal.kind).unwrap_or(0.0);
        if !delta.is_finite() {
            return profile.score;
        }
        (profile.score + delta).clamp(MIN_SCORE, MAX_SCORE)
    }

    /// Score after decaying `profile` up to `now`.
    ///
    /// No-op for a profile that has never had an event applied, or when
    /// `now` is not after `last_event_at`.
    pub fn apply_decay(&self, profile: &TrustProfile, now: DateTime<Utc>) -> f64 {
        match profile.last_event_at {
            Some(last) if now > last => {
                formula::decay_toward(profile.score, self.baseline, last, now, self.half_life)
            }
            _ => profile.score,
        }
    }

    /// Next profile after `signal`: new score, advanced `last_event_at`, log entry.
    pub fn signal_profile(&self, profile: &TrustProfile, signal: &Signal) -> TrustProfile {
        let score = self.apply_signal(profile, signal);
        let mut next = profile.clone();
        next.score = score;
        next.last_event_at = Some(match profile.last_event_at {
            Some(last) => last.max(signal.timestamp),
            None => signal.timestamp,
        });
        next.record_event(
            EventLogEntry {
                at: signal.timestamp,
                source: EventSource::signal(signal.kind.clone()),
                delta: score - profile.score,
            },
            self.event_log_horizon,
            self.event_log_max_entries,
        );
        next
    }

    /// Next profile after decaying to `now`, or `None` when decay changes nothing.
    pub fn decay_profile(&self, profile: &TrustProfile, now: DateTime<Utc>) -> Option<TrustProfile> {
        let last = profile.last_event_at?;
        if now <= last {
            return None;
        }
        let score = self.apply_decay(profile, now);
        if score == profile.score {
            return None;
        }
        let mut next = profile.clone();
        next.score = score;
        next.last_event_at = Some(now);
        next.record_event(
            EventLogEntry {
                at: now,
                source: EventSource::Decay,
                delta: score - profile.score,
            },
            self.event_log_horizon,
            self.event_log_max_entries,
        );
        Some(next)
    }
}
