//! TrustEngine: assembles the store, scorer, synchronizer, bus and scheduler.
//!
//! Construction order breaks the bus ↔ trust cycle: the capability snapshot
//! exists before the bus, so the capability authorizer can read it, and the
//! store is handed the finished bus to publish on.

use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn, Instrument};

use warden_bus::{ResolvedAuthorizer, SignalBus, Subscription, SubscriptionId};
use warden_core::errors::{AuthError, WardenError, WardenResult};
use warden_core::models::{BusEvent, PrincipalId, Signal, Topic, TrustProfile};
use warden_core::traits::{ISecurityPipeline, IStore};
use warden_core::WardenConfig;
use warden_observability::{EngineMetrics, MetricsSnapshot};

use crate::capability::{CapabilitySnapshot, CapabilitySynchronizer};
use crate::decay::{DecayScheduler, DecaySchedulerHandle};
use crate::score::ScoreEngine;
use crate::store::{TrustStore, UpdateOutcome};

/// The assembled trust engine.
pub struct TrustEngine {
    config: WardenConfig,
    scorer: Arc<ScoreEngine>,
    store: Arc<TrustStore>,
    bus: Arc<SignalBus>,
    decay: Arc<DecayScheduler>,
    metrics: Arc<EngineMetrics>,
}

impl TrustEngine {
    /// Validate `config`, wire every component, and load stored profiles.
    ///
    /// `pipeline` is required when the bus is configured for the
    /// `security_pipeline` authorizer and ignored otherwise.
    pub async fn bootstrap(
        config: WardenConfig,
        backend: Arc<dyn IStore>,
        pipeline: Option<Arc<dyn ISecurityPipeline>>,
    ) -> WardenResult<Arc<Self>> {
        config.validate()?;

        let metrics = Arc::new(EngineMetrics::new());
        let synchronizer = Arc::new(CapabilitySynchronizer::new(
            config.trust.capability_thresholds.clone(),
        ));
        let snapshot = Arc::new(CapabilitySnapshot::new(
            synchronizer.derive(config.trust.baseline_score),
        ));

        let authorizer = ResolvedAuthorizer::from_config(&config.bus, snapshot.clone(), pipeline)?;
        let bus = Arc::new(SignalBus::from_config(&config.bus, authorizer, Arc::clone(&metrics)));

        let store = Arc::new(TrustStore::new(
            backend,
            synchronizer,
            snapshot,
            Arc::clone(&bus),
            &config.trust,
        ));
        store.load_all().await?;

        let scorer = Arc::new(ScoreEngine::new(&config.trust, &config.decay));
        let decay = Arc::new(DecayScheduler::new(
            Arc::clone(&store),
            Arc::clone(&scorer),
            Arc::clone(&metrics),
            config.decay.decay_interval(),
        ));

        info!(
            strategy = ?config.bus.authorizer_strategy,
            baseline = config.trust.baseline_score,
            "trust engine ready"
        );

        Ok(Arc::new(Self {
            config,
            scorer,
            store,
            bus,
            decay,
            metrics,
        }))
    }

    pub fn config(&self) -> &WardenConfig {
        &self.config
    }

    pub fn scorer(&self) -> &ScoreEngine {
        &self.scorer
    }

    pub fn store(&self) -> &Arc<TrustStore> {
        &self.store
    }

    pub fn bus(&self) -> &Arc<SignalBus> {
        &self.bus
    }

    pub fn decay_scheduler(&self) -> &Arc<DecayScheduler> {
        &self.decay
    }

    /// Validate and apply one signal.
    ///
    /// Rejected signals are counted as rejected; signals that pass validation
    /// but fail in the store are counted as dropped.
    pub async fn ingest(&self, signal: Signal) -> WardenResult<UpdateOutcome> {
        let span = warden_observability::signal_span!(signal.principal_id, signal.kind);
        async {
            if let Err(e) = self.scorer.validate(&signal) {
                self.metrics.record_signal_rejected();
                warn!(error = %e, "signal rejected");
                return Err(WardenError::from(e));
            }

            let scorer = &self.scorer;
            match self
                .store
                .update(&signal.principal_id, |profile| {
                    Some(scorer.signal_profile(profile, &signal))
                })
                .await
            {
                Ok(outcome) => {
                    self.metrics.record_signal_applied();
                    debug!(before = outcome.before, after = outcome.after(), "signal applied");
                    Ok(outcome)
                }
                Err(e) => {
                    self.metrics.record_signal_dropped();
                    warn!(error = %e, "signal dropped");
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    pub fn get_profile(&self, principal_id: &PrincipalId) -> TrustProfile {
        self.store.get(principal_id)
    }

    pub fn get_capabilities(&self, principal_id: &PrincipalId) -> BTreeSet<String> {
        self.store.capabilities(principal_id)
    }

    pub fn has_capability(&self, principal_id: &PrincipalId, tag: &str) -> bool {
        self.store.has_capability(principal_id, tag)
    }

    /// Subscribe on behalf of a principal through the configured authorizer.
    pub async fn subscribe(
        &self,
        principal_id: &PrincipalId,
        topic: Topic,
    ) -> Result<Subscription, AuthError> {
        self.bus.subscribe(principal_id, topic).await
    }

    pub async fn forget(&self, principal_id: &PrincipalId) -> WardenResult<()> {
        self.store.forget(principal_id).await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Start the background decay scheduler, unless decay is disabled.
    pub fn start_decay(&self) -> Option<DecaySchedulerHandle> {
        if !self.config.decay.enabled {
            info!("decay disabled, scheduler not started");
            return None;
        }
        Some(Arc::clone(&self.decay).start())
    }

    /// Consume `Signal` events published on `trust_events`.
    ///
    /// Signals are sharded across `ingestion_workers` tasks by principal, so
    /// one principal's signals apply in publish order while different
    /// principals proceed in parallel.
    pub fn spawn_ingestion(self: &Arc<Self>) -> IngestionHandle {
        let mut subscription = self.bus.attach(Topic::TRUST_EVENTS);
        let subscription_id = subscription.id();
        let worker_count = self.config.trust.ingestion_workers.max(1);
        let capacity = self.config.bus.subscriber_capacity.max(1);

        let mut workers = JoinSet::new();
        let mut shards = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let (tx, mut rx) = mpsc::channel::<Signal>(capacity);
            let engine = Arc::clone(self);
            workers.spawn(async move {
                while let Some(signal) = rx.recv().await {
                    let principal = signal.principal_id.clone();
                    let engine = Arc::clone(&engine);
                    // A panicking signal must not take the shard down with it.
                    match tokio::spawn(async move { engine.ingest(signal).await }).await {
                        Ok(Ok(_)) => {}
                        // Already logged and counted inside ingest.
                        Ok(Err(_)) => {}
                        Err(e) => {
                            warn!(principal = %principal, error = %e, "signal ingestion task failed")
                        }
                    }
                }
            });
            shards.push(tx);
        }

        let join = tokio::spawn(async move {
            while let Some(message) = subscription.recv().await {
                let BusEvent::Signal(signal) = message.event else {
                    debug!(topic = %message.topic, "ignoring non-signal event");
                    continue;
                };
                let shard = shard_for(&signal.principal_id, shards.len());
                if shards[shard].send(signal).await.is_err() {
                    warn!(shard, "ingestion worker exited, stopping listener");
                    break;
                }
            }
            drop(shards);
            while workers.join_next().await.is_some() {}
            info!("ingestion listener stopped");
        });

        info!(workers = worker_count, "ingestion listener attached");
        IngestionHandle {
            subscription_id,
            bus: Arc::clone(&self.bus),
            join,
        }
    }
}

fn shard_for(principal_id: &PrincipalId, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    principal_id.hash(&mut hasher);
    (hasher.finish() % shards as u64) as usize
}

/// Handle to the `trust_events` ingestion listener.
pub struct IngestionHandle {
    subscription_id: SubscriptionId,
    bus: Arc<SignalBus>,
    join: JoinHandle<()>,
}

impl IngestionHandle {
    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    /// Detach from the bus, then wait until queued signals are applied.
    pub async fn stop(self) {
        self.bus.unsubscribe(self.subscription_id);
        if let Err(e) = self.join.await {
            warn!(error = %e, "ingestion listener failed");
        }
    }
}
