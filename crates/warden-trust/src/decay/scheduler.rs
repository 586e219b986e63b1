use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};

use warden_core::errors::{WardenError, WardenResult};
use warden_core::models::PrincipalId;
use warden_observability::EngineMetrics;

use crate::score::ScoreEngine;
use crate::store::TrustStore;

/// Outcome of one decay sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// The instant decay was computed against.
    pub now: DateTime<Utc>,
    /// Another sweep held the guard; nothing was done.
    pub skipped: bool,
    pub swept: usize,
    /// Principals whose score actually moved.
    pub decayed: usize,
    pub failures: Vec<(PrincipalId, String)>,
}

impl SweepReport {
    fn skipped(now: DateTime<Utc>) -> Self {
        Self {
            now,
            skipped: true,
            swept: 0,
            decayed: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// `Err(DecaySweepPartialFailure)` when any principal failed.
    pub fn into_result(self) -> WardenResult<Self> {
        if self.failures.is_empty() {
            return Ok(self);
        }
        Err(WardenError::DecaySweepPartialFailure {
            failed: self
                .failures
                .into_iter()
                .map(|(principal, reason)| (principal.0, reason))
                .collect(),
        })
    }
}

/// Releases the single-sweep guard even if the sweep is cancelled.
struct SweepGuard<'a>(&'a AtomicBool);

impl<'a> SweepGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Periodically pulls every profile toward the baseline.
pub struct DecayScheduler {
    store: Arc<TrustStore>,
    scorer: Arc<ScoreEngine>,
    metrics: Arc<EngineMetrics>,
    interval: Duration,
    is_running: AtomicBool,
}

impl DecayScheduler {
    pub fn new(
        store: Arc<TrustStore>,
        scorer: Arc<ScoreEngine>,
        metrics: Arc<EngineMetrics>,
        interval: Duration,
    ) -> Self {
        Self {
            store,
            scorer,
            metrics,
            interval,
            is_running: AtomicBool::new(false),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a sweep is in progress.
    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Decay every known principal to `now`.
    ///
    /// Returns a skipped report if another sweep is in progress. Per-principal
    /// failures are collected in the report; only failing to enumerate
    /// principals is an error.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> WardenResult<SweepReport> {
        let Some(_guard) = SweepGuard::acquire(&self.is_running) else {
            self.metrics.record_decay_sweep_skipped();
            debug!("decay sweep already running, tick skipped");
            return Ok(SweepReport::skipped(now));
        };

        let principals = self.store.principals().await?;
        let span = warden_observability::decay_span!(principals.len());

        let mut report = SweepReport {
            now,
            skipped: false,
            swept: principals.len(),
            decayed: 0,
            failures: Vec::new(),
        };

        async {
            for principal_id in &principals {
                let scorer = &self.scorer;
                match self
                    .store
                    .update(principal_id, |profile| scorer.decay_profile(profile, now))
                    .await
                {
                    Ok(outcome) if outcome.committed => report.decayed += 1,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(principal = %principal_id, error = %e, "decay failed for principal");
                        report.failures.push((principal_id.clone(), e.to_string()));
                    }
                }
            }
        }
        .instrument(span)
        .await;

        self.metrics.record_decay_sweep();
        self.metrics
            .record_decay_failures(report.failures.len() as u64);
        info!(
            swept = report.swept,
            decayed = report.decayed,
            failed = report.failures.len(),
            "decay sweep complete"
        );
        Ok(report)
    }

    /// Run sweeps every `interval` until the handle is shut down.
    ///
    /// Each tick spawns its own sweep so a slow sweep cannot delay the timer;
    /// overlapping ticks are skipped by the guard.
    pub fn start(self: Arc<Self>) -> DecaySchedulerHandle {
        let shutdown = Arc::new(Notify::new());
        let stop = Arc::clone(&shutdown);
        let period = self.interval;

        let join = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut sweeps = JoinSet::new();
            info!(interval_secs = period.as_secs(), "decay scheduler started");

            loop {
                tokio::select! {
                    _ = stop.notified() => break,
                    _ = ticker.tick() => {
                        let scheduler = Arc::clone(&self);
                        sweeps.spawn(async move { scheduler.run_tick().await });
                    }
                    Some(_) = sweeps.join_next(), if !sweeps.is_empty() => {}
                }
            }

            while sweeps.join_next().await.is_some() {}
            info!("decay scheduler stopped");
        });

        DecaySchedulerHandle { shutdown, join }
    }

    async fn run_tick(&self) {
        match self.sweep_once(Utc::now()).await {
            Ok(report) if !report.is_clean() => {
                warn!(failed = report.failures.len(), "decay sweep finished with failures");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "decay sweep aborted"),
        }
    }
}

/// Handle to a running [`DecayScheduler`].
pub struct DecaySchedulerHandle {
    shutdown: Arc<Notify>,
    join: JoinHandle<()>,
}

impl DecaySchedulerHandle {
    /// Stop ticking and wait for any in-flight sweep to finish.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.join.await {
            warn!(error = %e, "decay scheduler task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
