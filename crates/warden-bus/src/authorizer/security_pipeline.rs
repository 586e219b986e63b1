use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::warn;

use warden_core::config::AuthorizerStrategy;
use warden_core::errors::AuthError;
use warden_core::models::{PrincipalId, Topic};
use warden_core::traits::{ISecurityPipeline, PipelineRequest, PipelineVerdict};

use super::SubscriptionAuthorizer;

/// Delegates every decision to the external security pipeline.
///
/// Pipeline errors and timeouts deny the subscription.
#[derive(Clone)]
pub struct SecurityPipelineAuthorizer {
    pipeline: Arc<dyn ISecurityPipeline>,
    timeout: Duration,
}

impl SecurityPipelineAuthorizer {
    pub fn new(pipeline: Arc<dyn ISecurityPipeline>, timeout: Duration) -> Self {
        Self { pipeline, timeout }
    }
}

impl SubscriptionAuthorizer for SecurityPipelineAuthorizer {
    async fn authorize_subscription(
        &self,
        principal_id: &PrincipalId,
        topic: &Topic,
    ) -> Result<(), AuthError> {
        let request = PipelineRequest {
            principal_id: principal_id.clone(),
            topic: topic.clone(),
            requested_at: Utc::now(),
        };
        let denied = |reason: String| AuthError::Unauthorized {
            principal: principal_id.to_string(),
            topic: topic.to_string(),
            reason,
        };

        match tokio::time::timeout(self.timeout, self.pipeline.evaluate(&request)).await {
            Ok(Ok(PipelineVerdict::Allow)) => Ok(()),
            Ok(Ok(PipelineVerdict::Deny { reason })) => Err(denied(reason)),
            Ok(Err(e)) => {
                warn!(principal = %principal_id, %topic, error = %e, "security pipeline failed, denying");
                Err(denied(e.to_string()))
            }
            Err(_) => {
                warn!(
                    principal = %principal_id,
                    %topic,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "security pipeline timed out, denying"
                );
                Err(denied(format!(
                    "security pipeline timed out after {}ms",
                    self.timeout.as_millis()
                )))
            }
        }
    }

    fn strategy(&self) -> AuthorizerStrategy {
        AuthorizerStrategy::SecurityPipeline
    }
}
