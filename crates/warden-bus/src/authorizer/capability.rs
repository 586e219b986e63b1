use std::sync::Arc;

use tracing::debug;

use warden_core::config::AuthorizerStrategy;
use warden_core::errors::AuthError;
use warden_core::models::{PrincipalId, Topic};
use warden_core::traits::ICapabilityLookup;

use super::SubscriptionAuthorizer;
use crate::topic_policy::{TopicClass, TopicPolicy};

/// Fast local check against the principal's current capability snapshot.
///
/// Open topics pass. A restricted topic passes only when the principal holds
/// the topic's required tag. Never mutates trust state.
#[derive(Clone)]
pub struct CapabilityAuthorizer {
    policy: TopicPolicy,
    capabilities: Arc<dyn ICapabilityLookup>,
}

impl CapabilityAuthorizer {
    pub fn new(policy: TopicPolicy, capabilities: Arc<dyn ICapabilityLookup>) -> Self {
        Self {
            policy,
            capabilities,
        }
    }

    fn check(&self, principal_id: &PrincipalId, topic: &Topic) -> Result<(), AuthError> {
        match self.policy.classify(topic) {
            TopicClass::Open => Ok(()),
            TopicClass::Restricted { required_tag } => {
                if self.capabilities.has_capability(principal_id, required_tag) {
                    Ok(())
                } else {
                    debug!(principal = %principal_id, %topic, required_tag, "capability missing");
                    Err(AuthError::NoCapability {
                        principal: principal_id.to_string(),
                        topic: topic.to_string(),
                        required: required_tag.to_string(),
                    })
                }
            }
        }
    }
}

impl SubscriptionAuthorizer for CapabilityAuthorizer {
    async fn authorize_subscription(
        &self,
        principal_id: &PrincipalId,
        topic: &Topic,
    ) -> Result<(), AuthError> {
        self.check(principal_id, topic)
    }

    fn strategy(&self) -> AuthorizerStrategy {
        AuthorizerStrategy::Capability
    }
}
