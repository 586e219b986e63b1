use warden_core::config::AuthorizerStrategy;
use warden_core::errors::AuthError;
use warden_core::models::{PrincipalId, Topic};

use super::SubscriptionAuthorizer;

/// Authorizes everything, including principals the engine has never seen.
/// For local and test environments with no restriction policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAuthorizer;

impl SubscriptionAuthorizer for OpenAuthorizer {
    async fn authorize_subscription(
        &self,
        _principal_id: &PrincipalId,
        _topic: &Topic,
    ) -> Result<(), AuthError> {
        Ok(())
    }

    fn strategy(&self) -> AuthorizerStrategy {
        AuthorizerStrategy::Open
    }
}
