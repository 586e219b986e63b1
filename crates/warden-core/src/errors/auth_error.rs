/// Subscription denials. Returned to the caller synchronously and never
/// retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("principal {principal} is not authorized to subscribe to {topic}: {reason}")]
    Unauthorized {
        principal: String,
        topic: String,
        reason: String,
    },

    #[error("principal {principal} lacks capability {required} required for {topic}")]
    NoCapability {
        principal: String,
        topic: String,
        required: String,
    },
}
