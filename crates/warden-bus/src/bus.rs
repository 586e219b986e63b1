//! SignalBus: topic-keyed fan-out with isolated delivery per subscriber.
//!
//! Each subscriber owns a bounded channel. `publish` uses `try_send`, so it
//! never waits on a subscriber: a full queue drops the event for that
//! subscriber only, and a closed queue unregisters it.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn, Instrument};

use warden_core::config::BusConfig;
use warden_core::errors::AuthError;
use warden_core::models::{BusEvent, PrincipalId, Topic};
use warden_observability::EngineMetrics;

use crate::authorizer::{ResolvedAuthorizer, SubscriptionAuthorizer};
use crate::subscription::{BusMessage, Subscription, SubscriptionId};

struct Subscriber {
    id: SubscriptionId,
    sender: mpsc::Sender<BusMessage>,
}

/// In-process publish/subscribe bus.
pub struct SignalBus {
    registry: DashMap<Topic, Vec<Subscriber>>,
    topics_by_id: DashMap<SubscriptionId, Topic>,
    authorizer: ResolvedAuthorizer,
    capacity: usize,
    metrics: Arc<EngineMetrics>,
}

impl SignalBus {
    pub fn new(authorizer: ResolvedAuthorizer, capacity: usize, metrics: Arc<EngineMetrics>) -> Self {
        Self {
            registry: DashMap::new(),
            topics_by_id: DashMap::new(),
            authorizer,
            capacity: capacity.max(1),
            metrics,
        }
    }

    pub fn from_config(
        config: &BusConfig,
        authorizer: ResolvedAuthorizer,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self::new(authorizer, config.subscriber_capacity, metrics)
    }

    pub fn authorizer(&self) -> &ResolvedAuthorizer {
        &self.authorizer
    }

    /// Subscribe on behalf of a principal. Registers only when the
    /// authorizer approves.
    pub async fn subscribe(
        &self,
        principal_id: &PrincipalId,
        topic: Topic,
    ) -> Result<Subscription, AuthError> {
        let span = warden_observability::subscription_span!(principal_id, topic);
        async {
            match self.authorizer.authorize_subscription(principal_id, &topic).await {
                Ok(()) => {
                    self.metrics.record_subscription_granted();
                    Ok(self.register(topic, Some(principal_id.clone())))
                }
                Err(e) => {
                    self.metrics.record_subscription_denied();
                    info!(error = %e, "subscription denied");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Register an in-process listener wired at startup. Bypasses the
    /// principal authorizer; never hand the result to an external caller.
    pub fn attach(&self, topic: Topic) -> Subscription {
        self.register(topic, None)
    }

    /// Remove a subscription. Unknown or already-removed ids are a no-op.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let Some((_, topic)) = self.topics_by_id.remove(&id) else {
            return;
        };
        if let Some(mut subs) = self.registry.get_mut(&topic) {
            subs.retain(|s| s.id != id);
        }
        self.registry.remove_if(&topic, |_, subs| subs.is_empty());
        debug!(subscription = %id, %topic, "unsubscribed");
    }

    /// Fan `event` out to subscribers of `topic` and wildcard subscribers.
    ///
    /// Returns the number of subscribers that accepted the event.
    pub fn publish(&self, topic: &Topic, event: BusEvent) -> usize {
        let message = BusMessage {
            topic: topic.clone(),
            event,
            published_at: Utc::now(),
        };

        let mut delivered = 0usize;
        let mut closed = Vec::new();

        let wildcard = Topic::WILDCARD;
        let mut targets = vec![topic];
        if !topic.is_wildcard() {
            targets.push(&wildcard);
        }
        for target in targets {
            let Some(subs) = self.registry.get(target) else {
                continue;
            };
            for sub in subs.iter() {
                match sub.sender.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        self.metrics.record_event_dropped();
                        warn!(subscription = %sub.id, %topic, "subscriber queue full, event dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(sub.id),
                }
            }
        }

        for id in closed {
            self.unsubscribe(id);
        }
        self.metrics.record_events_delivered(delivered as u64);
        delivered
    }

    /// Number of live registrations on exactly `topic`.
    pub fn subscriber_count(&self, topic: &Topic) -> usize {
        self.registry.get(topic).map_or(0, |subs| subs.len())
    }

    fn register(&self, topic: Topic, principal: Option<PrincipalId>) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let id = SubscriptionId::new();
        self.registry
            .entry(topic.clone())
            .or_default()
            .push(Subscriber { id, sender });
        self.topics_by_id.insert(id, topic.clone());
        debug!(subscription = %id, %topic, principal = ?principal, "subscription registered");
        Subscription::new(id, topic, principal, receiver)
    }
}
