use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Decay subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayConfig {
    /// Time for a score's distance from baseline to halve (seconds).
    pub half_life_secs: u64,
    /// Interval between decay sweeps (seconds).
    pub decay_interval_secs: u64,
    /// Whether the background scheduler runs at all.
    pub enabled: bool,
}

impl Default for DecayConfig {
    fn default() -> Self {
        Self {
            half_life_secs: defaults::DEFAULT_HALF_LIFE_SECS,
            decay_interval_secs: defaults::DEFAULT_DECAY_INTERVAL_SECS,
            enabled: defaults::DEFAULT_DECAY_ENABLED,
        }
    }
}

impl DecayConfig {
    pub fn half_life(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.half_life_secs.min(i64::MAX as u64 / 1000) as i64)
    }

    pub fn decay_interval(&self) -> Duration {
        Duration::from_secs(self.decay_interval_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.half_life_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "decay.half_life_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.decay_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "decay.decay_interval_secs".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
