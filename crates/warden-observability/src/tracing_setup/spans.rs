//! Span definitions per operation: signal ingestion, profile update, decay, subscription.

/// Create a signal ingestion span.
#[macro_export]
macro_rules! signal_span {
    ($principal:expr, $kind:expr) => {
        tracing::info_span!("warden.signal", principal = %$principal, kind = %$kind)
    };
}

/// Create a profile update span.
#[macro_export]
macro_rules! update_span {
    ($principal:expr) => {
        tracing::debug_span!("warden.update", principal = %$principal)
    };
}

/// Create a decay sweep span.
#[macro_export]
macro_rules! decay_span {
    ($principal_count:expr) => {
        tracing::info_span!("warden.decay", principal_count = $principal_count)
    };
}

/// Create a subscription span.
#[macro_export]
macro_rules! subscription_span {
    ($principal:expr, $topic:expr) => {
        tracing::info_span!("warden.subscription", principal = %$principal, topic = %$topic)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const SIGNAL: &str = "warden.signal";
    pub const UPDATE: &str = "warden.update";
    pub const DECAY: &str = "warden.decay";
    pub const SUBSCRIPTION: &str = "warden.subscription";
}
