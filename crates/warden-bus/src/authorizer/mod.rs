//! Subscription authorization strategies.
//!
//! Exactly one strategy guards a bus. It is chosen from configuration once,
//! at startup, and held as a [`ResolvedAuthorizer`] so calls dispatch by
//! `match` rather than through a trait object. Restricted topics fail closed
//! under every strategy except [`OpenAuthorizer`].

mod capability;
mod open;
mod security_pipeline;

use std::future::Future;
use std::sync::Arc;

use warden_core::config::{AuthorizerStrategy, BusConfig};
use warden_core::errors::{AuthError, ConfigError};
use warden_core::models::{PrincipalId, Topic};
use warden_core::traits::{ICapabilityLookup, ISecurityPipeline};

pub use capability::CapabilityAuthorizer;
pub use open::OpenAuthorizer;
pub use security_pipeline::SecurityPipelineAuthorizer;

use crate::topic_policy::TopicPolicy;

/// Decides whether a principal may subscribe to a topic.
pub trait SubscriptionAuthorizer: Send + Sync {
    fn authorize_subscription(
        &self,
        principal_id: &PrincipalId,
        topic: &Topic,
    ) -> impl Future<Output = Result<(), AuthError>> + Send;

    /// Strategy name for logs.
    fn strategy(&self) -> AuthorizerStrategy;
}

/// The single authorizer selected at startup.
#[derive(Clone)]
pub enum ResolvedAuthorizer {
    Open(OpenAuthorizer),
    Capability(CapabilityAuthorizer),
    SecurityPipeline(SecurityPipelineAuthorizer),
}

impl ResolvedAuthorizer {
    /// Build the configured strategy.
    ///
    /// `pipeline` is only consulted for `security_pipeline`; selecting that
    /// strategy without one is a configuration error rather than a silent
    /// fallback.
    pub fn from_config(
        config: &BusConfig,
        capabilities: Arc<dyn ICapabilityLookup>,
        pipeline: Option<Arc<dyn ISecurityPipeline>>,
    ) -> Result<Self, ConfigError> {
        let resolved = match config.authorizer_strategy {
            AuthorizerStrategy::Open => Self::Open(OpenAuthorizer),
            AuthorizerStrategy::Capability => Self::Capability(CapabilityAuthorizer::new(
                TopicPolicy::from_config(config),
                capabilities,
            )),
            AuthorizerStrategy::SecurityPipeline => {
                let pipeline = pipeline.ok_or(ConfigError::MissingSecurityPipeline)?;
                Self::SecurityPipeline(SecurityPipelineAuthorizer::new(
                    pipeline,
                    config.pipeline_timeout(),
                ))
            }
        };
        tracing::info!(strategy = ?resolved.strategy(), "subscription authorizer resolved");
        Ok(resolved)
    }
}

impl SubscriptionAuthorizer for ResolvedAuthorizer {
    async fn authorize_subscription(
        &self,
        principal_id: &PrincipalId,
        topic: &Topic,
    ) -> Result<(), AuthError> {
        match self {
            Self::Open(a) => a.authorize_subscription(principal_id, topic).await,
            Self::Capability(a) => a.authorize_subscription(principal_id, topic).await,
            Self::SecurityPipeline(a) => a.authorize_subscription(principal_id, topic).await,
        }
    }

    fn strategy(&self) -> AuthorizerStrategy {
        match self {
            Self::Open(a) => a.strategy(),
            Self::Capability(a) => a.strategy(),
            Self::SecurityPipeline(a) => a.strategy(),
        }
    }
}

impl From<OpenAuthorizer> for ResolvedAuthorizer {
    fn from(a: OpenAuthorizer) -> Self {
        Self::Open(a)
    }
}

impl From<CapabilityAuthorizer> for ResolvedAuthorizer {
    fn from(a: CapabilityAuthorizer) -> Self {
        Self::Capability(a)
    }
}

impl From<SecurityPipelineAuthorizer> for ResolvedAuthorizer {
    fn from(a: SecurityPipelineAuthorizer) -> Self {
        Self::SecurityPipeline(a)
    }
}
