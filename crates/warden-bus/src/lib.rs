//! # warden-bus
//!
//! In-process publish/subscribe for trust-relevant events.
//!
//! ## Modules
//!
//! - [`bus`]: [`SignalBus`], topic fan-out with isolated, bounded delivery per subscriber
//! - [`topic_policy`]: open vs. restricted topic classification
//! - [`subscription`]: subscriber handles and delivered messages
//! - [`authorizer`]: the subscription gate: open, capability, or security pipeline

pub mod authorizer;
pub mod bus;
pub mod subscription;
pub mod topic_policy;

pub use authorizer::{
    CapabilityAuthorizer, OpenAuthorizer, ResolvedAuthorizer, SecurityPipelineAuthorizer,
    SubscriptionAuthorizer,
};
pub use bus::SignalBus;
pub use subscription::{BusMessage, Subscription, SubscriptionId};
pub use topic_policy::{TopicClass, TopicPolicy};
