use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Which subscription authorizer guards the signal bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizerStrategy {
    /// Every subscription is authorized. Local and test environments only.
    Open,
    /// Restricted topics require a capability tag held by the principal.
    #[default]
    Capability,
    /// Every subscription is evaluated by the external security pipeline.
    SecurityPipeline,
}

/// Signal bus configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    pub authorizer_strategy: AuthorizerStrategy,
    /// Bounded queue depth per subscriber. Events beyond it are dropped for
    /// that subscriber only.
    pub subscriber_capacity: usize,
    /// Restricted topic → capability tag required to subscribe.
    pub restricted_topics: BTreeMap<String, String>,
    /// Deadline for one security pipeline evaluation. Expiry denies.
    pub pipeline_timeout_ms: u64,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            authorizer_strategy: AuthorizerStrategy::default(),
            subscriber_capacity: defaults::DEFAULT_SUBSCRIBER_CAPACITY,
            restricted_topics: defaults::DEFAULT_RESTRICTED_TOPICS
                .iter()
                .map(|(topic, tag)| (topic.to_string(), tag.to_string()))
                .collect(),
            pipeline_timeout_ms: defaults::DEFAULT_PIPELINE_TIMEOUT_MS,
        }
    }
}

impl BusConfig {
    pub fn pipeline_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.pipeline_timeout_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.subscriber_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "bus.subscriber_capacity".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some((topic, _)) = self.restricted_topics.iter().find(|(_, tag)| tag.is_empty()) {
            return Err(ConfigError::Invalid {
                field: format!("bus.restricted_topics.{topic}"),
                reason: "required capability tag is empty".to_string(),
            });
        }
        Ok(())
    }
}
