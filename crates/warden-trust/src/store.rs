//! TrustStore: the only writer of trust profiles.
//!
//! Every mutation runs under a per-principal tokio mutex for the whole
//! read-modify-write-publish sequence:
//!
//! 1. acquire the principal's lock (bounded by `lock_timeout`)
//! 2. load the current profile from the backing store, or the baseline
//!    (evicting a cached profile whose record was deleted externally)
//! 3. apply the caller's transition
//! 4. clamp the score, reconcile capabilities, prune the event log
//! 5. persist with bounded retries
//! 6. refresh the in-memory snapshot
//! 7. publish `ScoreChanged`, then each capability event
//!
//! Tokio mutexes hand the lock out in FIFO order, so updates for one principal
//! commit in the order they were admitted. Different principals never share a lock.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn, Instrument};

use warden_bus::SignalBus;
use warden_core::config::TrustConfig;
use warden_core::constants::{MAX_SCORE, MIN_SCORE, PROFILE_NAMESPACE};
use warden_core::errors::{StoreError, WardenResult};
use warden_core::models::{BusEvent, PrincipalId, ScoreChanged, Topic, TrustProfile};
use warden_core::traits::{ICapabilityLookup, IStore, StoreResult};

use crate::capability::{CapabilitySnapshot, CapabilitySynchronizer, Reconciliation};
use crate::retry::RetryPolicy;

/// Result of a [`TrustStore::update`].
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// The profile as committed, or the unchanged current profile.
    pub profile: TrustProfile,
    /// Score before the transition.
    pub before: f64,
    /// `false` when the transition declined to change anything.
    pub committed: bool,
    pub reconciliation: Reconciliation,
}

impl UpdateOutcome {
    pub fn after(&self) -> f64 {
        self.profile.score
    }
}

/// Serialized, durable home of every trust profile.
pub struct TrustStore {
    backend: Arc<dyn IStore>,
    synchronizer: Arc<CapabilitySynchronizer>,
    snapshot: Arc<CapabilitySnapshot>,
    bus: Arc<SignalBus>,
    profiles: DashMap<PrincipalId, TrustProfile>,
    locks: DashMap<PrincipalId, Arc<Mutex<()>>>,
    retry: RetryPolicy,
    lock_timeout: Duration,
    baseline_score: f64,
    event_log_horizon: chrono::Duration,
    event_log_max_entries: usize,
}

impl TrustStore {
    pub fn new(
        backend: Arc<dyn IStore>,
        synchronizer: Arc<CapabilitySynchronizer>,
        snapshot: Arc<CapabilitySnapshot>,
        bus: Arc<SignalBus>,
        config: &TrustConfig,
    ) -> Self {
        Self {
            backend,
            synchronizer,
            snapshot,
            bus,
            profiles: DashMap::new(),
            locks: DashMap::new(),
            retry: RetryPolicy::new(config.store_max_retries, config.store_retry_backoff()),
            lock_timeout: config.lock_timeout(),
            baseline_score: config.baseline_score,
            event_log_horizon: config.event_log_horizon(),
            event_log_max_entries: config.event_log_max_entries,
        }
    }

    /// Fresh profile for a principal with no history.
    pub fn baseline(&self, principal_id: &PrincipalId) -> TrustProfile {
        TrustProfile::baseline(
            principal_id.clone(),
            self.baseline_score,
            self.synchronizer.derive(self.baseline_score),
        )
    }

    /// Current profile. Never fails.
    ///
    /// A backing-store read failure is logged and answered with an uncached
    /// baseline profile.
    pub fn get(&self, principal_id: &PrincipalId) -> TrustProfile {
        if let Some(cached) = self.profiles.get(principal_id) {
            return cached.value().clone();
        }

        let profile = match self.read_backing(principal_id) {
            Ok(Some(profile)) => profile,
            Ok(None) => return self.baseline(principal_id),
            Err(e) => {
                warn!(principal = %principal_id, error = %e, "profile read failed, serving baseline");
                return self.baseline(principal_id);
            }
        };

        // A concurrent commit wins over what we just read.
        match self.profiles.entry(principal_id.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                self.snapshot
                    .set(principal_id, profile.capability_set.clone());
                entry.insert(profile).value().clone()
            }
        }
    }

    /// Atomically transition one principal's profile.
    ///
    /// `transition` returns `None` to leave the profile untouched; nothing is
    /// persisted or published in that case.
    pub async fn update<F>(&self, principal_id: &PrincipalId, transition: F) -> WardenResult<UpdateOutcome>
    where
        F: FnOnce(&TrustProfile) -> Option<TrustProfile>,
    {
        let span = warden_observability::update_span!(principal_id);
        self.update_locked(principal_id, transition)
            .instrument(span)
            .await
    }

    /// Every principal with a stored or cached profile, sorted.
    pub async fn principals(&self) -> WardenResult<Vec<PrincipalId>> {
        let keys = self
            .retry
            .run("list", || self.backend.list(PROFILE_NAMESPACE))
            .await?;

        let mut principals: BTreeSet<PrincipalId> = keys
            .iter()
            .filter_map(|key| TrustProfile::principal_from_key(key))
            .collect();
        principals.extend(self.profiles.iter().map(|entry| entry.key().clone()));
        Ok(principals.into_iter().collect())
    }

    /// Committed capability set. Unknown principals get the baseline set.
    pub fn capabilities(&self, principal_id: &PrincipalId) -> BTreeSet<String> {
        self.snapshot.capabilities(principal_id)
    }

    pub fn has_capability(&self, principal_id: &PrincipalId, tag: &str) -> bool {
        self.snapshot.has_capability(principal_id, tag)
    }

    /// Administratively delete a principal's profile.
    ///
    /// The next signal for the principal starts again from the baseline.
    pub async fn forget(&self, principal_id: &PrincipalId) -> WardenResult<()> {
        let _guard = self.lock(principal_id).await?;
        let key = TrustProfile::storage_key(principal_id);
        self.retry
            .run("delete", || self.backend.delete(&key))
            .await?;
        self.profiles.remove(principal_id);
        self.snapshot.remove(principal_id);
        info!(principal = %principal_id, "profile forgotten");
        Ok(())
    }

    /// Load every stored profile into the snapshot. Returns how many loaded.
    ///
    /// Corrupt records are logged and skipped; the next update for such a
    /// principal fails until the record is repaired or forgotten.
    pub async fn load_all(&self) -> WardenResult<usize> {
        let keys = self
            .retry
            .run("list", || self.backend.list(PROFILE_NAMESPACE))
            .await?;

        let mut loaded = 0;
        for key in keys {
            let Some(principal_id) = TrustProfile::principal_from_key(&key) else {
                continue;
            };
            match self.read_backing(&principal_id) {
                Ok(Some(profile)) => {
                    self.snapshot
                        .set(&principal_id, profile.capability_set.clone());
                    self.profiles.insert(principal_id, profile);
                    loaded += 1;
                }
                Ok(None) => {}
                Err(e) => warn!(principal = %principal_id, error = %e, "skipping unreadable profile"),
            }
        }
        info!(loaded, "profiles loaded");
        Ok(loaded)
    }

    pub fn cached_len(&self) -> usize {
        self.profiles.len()
    }

    async fn update_locked<F>(&self, principal_id: &PrincipalId, transition: F) -> WardenResult<UpdateOutcome>
    where
        F: FnOnce(&TrustProfile) -> Option<TrustProfile>,
    {
        let _guard = self.lock(principal_id).await?;

        let current = match self.load(principal_id).await? {
            Some(profile) => profile,
            None => {
                let baseline = self.baseline(principal_id);
                self.evict_stale(principal_id, &baseline);
                baseline
            }
        };
        let before = current.score;

        let Some(mut next) = transition(&current) else {
            return Ok(UpdateOutcome {
                profile: current,
                before,
                committed: false,
                reconciliation: Reconciliation::default(),
            });
        };

        next.principal_id = principal_id.clone();
        if next.score.is_nan() {
            warn!(principal = %principal_id, "transition produced NaN score, keeping current");
            next.score = current.score;
        }
        next.score = next.score.clamp(MIN_SCORE, MAX_SCORE);

        let reconciliation = self.synchronizer.reconcile(&current, &next);
        next.capability_set = reconciliation.settled.clone();
        next.prune_event_log(self.event_log_horizon, self.event_log_max_entries);

        let key = TrustProfile::storage_key(principal_id);
        let bytes = serde_json::to_vec(&next)?;
        self.retry
            .run("put", || self.backend.put(&key, &bytes))
            .await?;

        self.profiles.insert(principal_id.clone(), next.clone());
        self.snapshot.set(principal_id, next.capability_set.clone());

        self.publish_changes(&current, &next, &reconciliation);

        debug!(
            before,
            after = next.score,
            granted = reconciliation.granted.len(),
            revoked = reconciliation.revoked.len(),
            "profile committed"
        );
        Ok(UpdateOutcome {
            profile: next,
            before,
            committed: true,
            reconciliation,
        })
    }

    async fn lock(&self, principal_id: &PrincipalId) -> StoreResult<OwnedMutexGuard<()>> {
        let lock = Arc::clone(self.locks.entry(principal_id.clone()).or_default().value());
        tokio::time::timeout(self.lock_timeout, lock.lock_owned())
            .await
            .map_err(|_| StoreError::LockTimeout {
                principal: principal_id.to_string(),
                waited_ms: self.lock_timeout.as_millis() as u64,
            })
    }

    /// The backing store is the source of truth under the lock; the cache
    /// may be stale after an external delete.
    async fn load(&self, principal_id: &PrincipalId) -> StoreResult<Option<TrustProfile>> {
        let key = TrustProfile::storage_key(principal_id);
        let bytes = self.retry.run("get", || self.backend.get(&key)).await?;
        bytes
            .map(|bytes| decode(&key, principal_id, &bytes))
            .transpose()
    }

    /// Drop a cached profile whose record vanished from the backing store,
    /// announcing the fall back to `baseline`. Caller holds the principal lock.
    fn evict_stale(&self, principal_id: &PrincipalId, baseline: &TrustProfile) {
        let Some((_, stale)) = self.profiles.remove(principal_id) else {
            return;
        };
        self.snapshot.remove(principal_id);
        warn!(principal = %principal_id, "stored profile deleted externally, reverting to baseline");

        let reconciliation = self.synchronizer.reconcile(&stale, baseline);
        if stale.score != baseline.score || !reconciliation.is_empty() {
            self.publish_changes(&stale, baseline, &reconciliation);
        }
    }

    fn read_backing(&self, principal_id: &PrincipalId) -> StoreResult<Option<TrustProfile>> {
        let key = TrustProfile::storage_key(principal_id);
        self.backend
            .get(&key)?
            .map(|bytes| decode(&key, principal_id, &bytes))
            .transpose()
    }

    fn publish_changes(&self, current: &TrustProfile, next: &TrustProfile, reconciliation: &Reconciliation) {
        let at = next.last_event_at.unwrap_or_else(Utc::now);
        let source = next
            .event_log
            .last()
            .filter(|newest| current.event_log.last() != Some(*newest))
            .map(|newest| newest.source.clone());

        self.bus.publish(
            &Topic::SCORE_EVENTS,
            BusEvent::ScoreChanged(ScoreChanged {
                principal_id: next.principal_id.clone(),
                before: current.score,
                after: next.score,
                source,
                at,
            }),
        );

        for event in self
            .synchronizer
            .events(&next.principal_id, reconciliation, at)
        {
            self.bus
                .publish(&Topic::CAPABILITY_EVENTS, BusEvent::Capability(event));
        }
    }
}

fn decode(key: &str, principal_id: &PrincipalId, bytes: &[u8]) -> StoreResult<TrustProfile> {
    let mut profile: TrustProfile =
        serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        })?;
    profile.principal_id = principal_id.clone();
    Ok(profile)
}
