//! Configuration for every Warden subsystem.
//!
//! All sections use `#[serde(default)]`, so a TOML file only has to name the
//! values it overrides.

pub mod bus_config;
pub mod decay_config;
pub mod defaults;
pub mod observability_config;
pub mod storage_config;
pub mod trust_config;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use bus_config::{AuthorizerStrategy, BusConfig};
pub use decay_config::DecayConfig;
pub use observability_config::ObservabilityConfig;
pub use storage_config::{StorageBackend, StorageConfig};
pub use trust_config::TrustConfig;

use crate::errors::{ConfigError, WardenResult};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub trust: TrustConfig,
    pub decay: DecayConfig,
    pub bus: BusConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl WardenConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> WardenResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load, parse and validate a configuration file.
    pub fn from_file(path: &Path) -> WardenResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> WardenResult<String> {
        toml::to_string(self).map_err(|e| {
            ConfigError::Parse {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> WardenResult<()> {
        self.trust.validate()?;
        self.decay.validate()?;
        self.bus.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}
