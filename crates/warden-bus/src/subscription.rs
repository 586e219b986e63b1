use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use uuid::Uuid;

use warden_core::models::{BusEvent, PrincipalId, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An event as delivered to one subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct BusMessage {
    /// Topic the event was published on (differs from the subscription
    /// topic for wildcard subscribers).
    pub topic: Topic,
    pub event: BusEvent,
    pub published_at: DateTime<Utc>,
}

/// Receiving end of a registered subscription.
///
/// Dropping it closes the channel; the bus prunes the subscriber on its next
/// publish to the topic.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    principal: Option<PrincipalId>,
    receiver: mpsc::Receiver<BusMessage>,
}

impl Subscription {
    pub(crate) fn new(
        id: SubscriptionId,
        topic: Topic,
        principal: Option<PrincipalId>,
        receiver: mpsc::Receiver<BusMessage>,
    ) -> Self {
        Self {
            id,
            topic,
            principal,
            receiver,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// `None` for in-process listeners attached at startup.
    pub fn principal(&self) -> Option<&PrincipalId> {
        self.principal.as_ref()
    }

    /// Wait for the next message. `None` once unsubscribed and drained.
    pub async fn recv(&mut self) -> Option<BusMessage> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<BusMessage> {
        self.receiver.try_recv().ok()
    }
}
