//! End-to-end TrustEngine tests: fixture scenarios, bus ingestion,
//! capability-gated subscriptions, and persistence across restarts.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use warden_core::config::{AuthorizerStrategy, StorageBackend, WardenConfig};
use warden_core::errors::{AuthError, ConfigError, PipelineError, SignalError, StoreError, WardenError};
use warden_core::models::{
    signal_kinds, BusEvent, CapabilityAction, EventSource, PrincipalId, Signal, Topic, TrustProfile,
};
use warden_core::traits::{ISecurityPipeline, IStore, PipelineRequest, PipelineVerdict, StoreResult};
use warden_storage::MemoryStore;
use warden_trust::TrustEngine;

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
}

async fn memory_engine(config: WardenConfig) -> Arc<TrustEngine> {
    TrustEngine::bootstrap(config, Arc::new(MemoryStore::new()), None)
        .await
        .unwrap()
}

async fn wait_for(engine: &TrustEngine, applied: u64) {
    for _ in 0..200 {
        if engine.metrics().signals_applied >= applied {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!(
        "only {} of {applied} signals applied",
        engine.metrics().signals_applied
    );
}

#[tokio::test]
async fn fixture_scenarios_replay() {
    let scenarios = test_fixtures::trust_scenarios();
    assert!(!scenarios.is_empty());

    for scenario in scenarios {
        let mut config = WardenConfig::default();
        if let Some(thresholds) = &scenario.capability_thresholds {
            config.trust.capability_thresholds = thresholds.clone();
        }
        let engine = memory_engine(config).await;
        let mut capability_events = engine.bus().attach(Topic::CAPABILITY_EVENTS);
        let id = PrincipalId::from(scenario.principal.as_str());

        for (i, step) in scenario.steps.iter().enumerate() {
            match step {
                test_fixtures::ScenarioStep::Signal {
                    kind,
                    magnitude,
                    at_secs,
                    ..
                } => {
                    engine
                        .ingest(Signal::new(id.clone(), kind.clone(), *magnitude, scenario.at(*at_secs)))
                        .await
                        .unwrap();
                }
                test_fixtures::ScenarioStep::Decay { at_secs, .. } => {
                    engine
                        .decay_scheduler()
                        .sweep_once(scenario.at(*at_secs))
                        .await
                        .unwrap()
                        .into_result()
                        .unwrap();
                }
            }

            let expect = step.expect();
            let label = format!("{} step {i}", scenario.name);
            let score = engine.get_profile(&id).score;
            assert!((score - expect.score).abs() < 1e-9, "{label}: score {score}");

            let expected_caps: BTreeSet<String> = expect.capabilities.iter().cloned().collect();
            assert_eq!(engine.get_capabilities(&id), expected_caps, "{label}");

            let mut granted = Vec::new();
            let mut revoked = Vec::new();
            while let Some(message) = capability_events.try_recv() {
                if let BusEvent::Capability(event) = message.event {
                    match event.action {
                        CapabilityAction::Granted => granted.push(event.tag),
                        CapabilityAction::Revoked => revoked.push(event.tag),
                    }
                }
            }
            assert_eq!(granted, expect.granted, "{label}: granted");
            assert_eq!(revoked, expect.revoked, "{label}: revoked");
        }
    }
}

#[tokio::test]
async fn invalid_signal_is_rejected_and_counted() {
    let engine = memory_engine(WardenConfig::default()).await;

    let err = engine
        .ingest(Signal::new("agent-1", "gossip", 0.5, t0()))
        .await
        .err()
        .expect("unknown kind rejected");
    assert!(matches!(err, WardenError::SignalError(SignalError::UnknownKind { .. })));

    let err = engine
        .ingest(Signal::new("agent-1", signal_kinds::VIOLATION, f64::INFINITY, t0()))
        .await
        .err()
        .expect("infinite magnitude rejected");
    assert!(matches!(err, WardenError::SignalError(SignalError::InvalidMagnitude { .. })));

    let metrics = engine.metrics();
    assert_eq!(metrics.signals_rejected, 2);
    assert_eq!(metrics.signals_applied, 0);
    assert!(engine.store().principals().await.unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_timestamp_is_rejected_and_counted() {
    let engine = memory_engine(WardenConfig::default()).await;

    let err = engine
        .ingest(Signal::new("agent-1", signal_kinds::VIOLATION, -0.1, DateTime::<Utc>::MIN_UTC))
        .await
        .err()
        .expect("timestamp rejected");
    assert!(matches!(err, WardenError::SignalError(SignalError::InvalidTimestamp { .. })));

    let metrics = engine.metrics();
    assert_eq!(metrics.signals_rejected, 1);
    assert_eq!(metrics.signals_applied, 0);
    assert_eq!(engine.get_profile(&PrincipalId::from("agent-1")).score, 0.5);
}

#[tokio::test]
async fn bus_ingestion_survives_out_of_range_timestamp() {
    let mut config = WardenConfig::default();
    config.trust.ingestion_workers = 1;
    let engine = memory_engine(config).await;
    let ingestion = engine.spawn_ingestion();

    engine.bus().publish(
        &Topic::TRUST_EVENTS,
        BusEvent::Signal(Signal::new(
            "agent-0",
            signal_kinds::VIOLATION,
            -0.1,
            DateTime::<Utc>::MIN_UTC,
        )),
    );
    for n in 1..=5 {
        engine.bus().publish(
            &Topic::TRUST_EVENTS,
            BusEvent::Signal(Signal::new(
                format!("agent-{n}"),
                signal_kinds::TASK_SUCCESS,
                1.0,
                t0(),
            )),
        );
    }
    wait_for(&engine, 5).await;
    ingestion.stop().await;

    let metrics = engine.metrics();
    assert_eq!(metrics.signals_applied, 5);
    assert_eq!(metrics.signals_rejected, 1);
}

#[tokio::test]
async fn externally_deleted_profile_falls_back_to_baseline_after_sweep() {
    let backend = Arc::new(MemoryStore::new());
    let engine = TrustEngine::bootstrap(WardenConfig::default(), backend.clone(), None)
        .await
        .unwrap();
    let id = PrincipalId::from("deleted");

    engine
        .ingest(Signal::new(id.clone(), signal_kinds::ENDORSEMENT, 1.0, t0()))
        .await
        .unwrap();
    assert!(engine.has_capability(&id, "security_subscribe"));
    let mut capability_events = engine.bus().attach(Topic::CAPABILITY_EVENTS);

    backend
        .delete(&TrustProfile::storage_key(&id))
        .unwrap();
    let report = engine
        .decay_scheduler()
        .sweep_once(t0() + chrono::Duration::days(7))
        .await
        .unwrap();
    assert!(report.is_clean());

    let baseline = engine.store().baseline(&id);
    assert_eq!(engine.get_profile(&id).score, 0.5);
    assert_eq!(engine.get_capabilities(&id), baseline.capability_set);
    assert!(matches!(
        engine.subscribe(&id, Topic::SECURITY).await,
        Err(AuthError::NoCapability { .. })
    ));

    let mut revoked = BTreeSet::new();
    while let Some(message) = capability_events.try_recv() {
        if let BusEvent::Capability(event) = message.event {
            assert_eq!(event.action, CapabilityAction::Revoked);
            revoked.insert(event.tag);
        }
    }
    assert!(revoked.contains("security_subscribe"));
}

/// Accepts reads and listings; every write fails.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryStore,
}

impl IStore for ReadOnlyStore {
    fn put(&self, _key: &str, _value: &[u8]) -> StoreResult<()> {
        Err(StoreError::unavailable("read-only replica"))
    }

    fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn delete(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::unavailable("read-only replica"))
    }

    fn list(&self, namespace: &str) -> StoreResult<Vec<String>> {
        self.inner.list(namespace)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        self.inner.exists(key)
    }
}

#[tokio::test(start_paused = true)]
async fn signal_lost_to_store_failure_is_counted_as_dropped() {
    let engine = TrustEngine::bootstrap(
        WardenConfig::default(),
        Arc::new(ReadOnlyStore::default()),
        None,
    )
    .await
    .unwrap();

    let err = engine
        .ingest(Signal::new("agent-1", signal_kinds::ENDORSEMENT, 1.0, t0()))
        .await
        .err()
        .expect("write fails");
    assert!(err.is_retryable());

    let metrics = engine.metrics();
    assert_eq!(metrics.signals_dropped, 1);
    assert_eq!(metrics.signals_applied, 0);
    assert_eq!(engine.get_profile(&PrincipalId::from("agent-1")).score, 0.5);
}

#[tokio::test]
async fn bus_signals_apply_in_publish_order() {
    let engine = memory_engine(WardenConfig::default()).await;
    let ingestion = engine.spawn_ingestion();
    let id = PrincipalId::from("bus-agent");

    // endorsement then violation ends at 0.0; the reverse order would end at 0.5
    engine.bus().publish(
        &Topic::TRUST_EVENTS,
        BusEvent::Signal(Signal::new(id.clone(), signal_kinds::ENDORSEMENT, 1.0, t0())),
    );
    engine.bus().publish(
        &Topic::TRUST_EVENTS,
        BusEvent::Signal(Signal::new(
            id.clone(),
            signal_kinds::VIOLATION,
            -1.0,
            t0() + chrono::Duration::seconds(1),
        )),
    );
    wait_for(&engine, 2).await;

    let profile = engine.get_profile(&id);
    assert_eq!(profile.score, 0.0);
    let sources: Vec<&str> = profile.event_log.iter().map(|e| e.source.label()).collect();
    assert_eq!(sources, vec!["endorsement", "violation"]);

    ingestion.stop().await;
    assert_eq!(engine.bus().subscriber_count(&Topic::TRUST_EVENTS), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn bus_ingestion_handles_many_principals() {
    let engine = memory_engine(WardenConfig::default()).await;
    let ingestion = engine.spawn_ingestion();

    for n in 0..32 {
        engine.bus().publish(
            &Topic::TRUST_EVENTS,
            BusEvent::Signal(Signal::new(
                format!("agent-{n}"),
                signal_kinds::TASK_SUCCESS,
                1.0,
                t0(),
            )),
        );
    }
    // Malformed signals on the bus are rejected, not fatal.
    engine.bus().publish(
        &Topic::TRUST_EVENTS,
        BusEvent::Signal(Signal::new("", signal_kinds::TASK_SUCCESS, 1.0, t0())),
    );
    wait_for(&engine, 32).await;
    ingestion.stop().await;

    let metrics = engine.metrics();
    assert_eq!(metrics.signals_applied, 32);
    assert_eq!(metrics.signals_rejected, 1);
    assert_eq!(engine.store().principals().await.unwrap().len(), 32);
}

#[tokio::test]
async fn capability_authorizer_gates_restricted_topics_by_score() {
    let engine = memory_engine(WardenConfig::default()).await;
    let id = PrincipalId::from("climber");

    match engine.subscribe(&id, Topic::SECURITY).await {
        Err(AuthError::NoCapability { required, .. }) => assert_eq!(required, "security_subscribe"),
        other => panic!("expected NoCapability, got {other:?}"),
    }
    assert!(engine.subscribe(&id, Topic::TELEMETRY).await.is_ok());
    assert!(engine.subscribe(&id, Topic::SCORE_EVENTS).await.is_ok());

    engine
        .ingest(Signal::new(id.clone(), signal_kinds::ENDORSEMENT, 1.0, t0()))
        .await
        .unwrap();
    assert!(engine.has_capability(&id, "security_subscribe"));
    let mut security = engine.subscribe(&id, Topic::SECURITY).await.unwrap();

    engine
        .ingest(Signal::new(
            id.clone(),
            signal_kinds::POLICY_BREACH,
            -1.0,
            t0() + chrono::Duration::seconds(5),
        ))
        .await
        .unwrap();
    assert!(!engine.has_capability(&id, "security_subscribe"));
    assert!(matches!(
        engine.subscribe(&id, Topic::SECURITY).await,
        Err(AuthError::NoCapability { .. })
    ));

    // Revocation gates new subscriptions only.
    engine.bus().publish(
        &Topic::SECURITY,
        BusEvent::Telemetry {
            name: "audit".to_string(),
            payload: serde_json::json!({ "ok": true }),
        },
    );
    assert!(security.try_recv().is_some());

    let metrics = engine.metrics();
    assert_eq!(metrics.subscriptions_denied, 2);
    assert_eq!(metrics.subscriptions_granted, 3);
}

#[tokio::test]
async fn open_strategy_authorizes_everything() {
    let mut config = WardenConfig::default();
    config.bus.authorizer_strategy = AuthorizerStrategy::Open;
    let engine = memory_engine(config).await;
    let nobody = PrincipalId::from("nobody");

    for topic in [Topic::SECURITY, Topic::IDENTITY, Topic::CAPABILITY_EVENTS, Topic::WILDCARD] {
        assert!(engine.subscribe(&nobody, topic).await.is_ok());
    }
}

#[tokio::test]
async fn security_pipeline_strategy_requires_a_pipeline() {
    let mut config = WardenConfig::default();
    config.bus.authorizer_strategy = AuthorizerStrategy::SecurityPipeline;

    let result = TrustEngine::bootstrap(config, Arc::new(MemoryStore::new()), None).await;
    match result {
        Err(WardenError::ConfigError(ConfigError::MissingSecurityPipeline)) => {}
        Err(other) => panic!("expected MissingSecurityPipeline, got {other}"),
        Ok(_) => panic!("bootstrap should fail without a pipeline"),
    }
}

struct OnlyAuditors;

#[async_trait]
impl ISecurityPipeline for OnlyAuditors {
    async fn evaluate(&self, request: &PipelineRequest) -> Result<PipelineVerdict, PipelineError> {
        if request.principal_id.as_str().starts_with("auditor-") {
            Ok(PipelineVerdict::Allow)
        } else {
            Ok(PipelineVerdict::Deny {
                reason: "not an auditor".to_string(),
            })
        }
    }
}

#[tokio::test]
async fn security_pipeline_strategy_delegates_decisions() {
    let mut config = WardenConfig::default();
    config.bus.authorizer_strategy = AuthorizerStrategy::SecurityPipeline;
    let engine = TrustEngine::bootstrap(
        config,
        Arc::new(MemoryStore::new()),
        Some(Arc::new(OnlyAuditors)),
    )
    .await
    .unwrap();

    assert!(engine
        .subscribe(&PrincipalId::from("auditor-1"), Topic::SECURITY)
        .await
        .is_ok());
    assert!(matches!(
        engine
            .subscribe(&PrincipalId::from("intern-1"), Topic::SECURITY)
            .await,
        Err(AuthError::Unauthorized { .. })
    ));
}

#[tokio::test]
async fn forget_resets_principal_to_baseline() {
    let engine = memory_engine(WardenConfig::default()).await;
    let id = PrincipalId::from("agent-1");
    engine
        .ingest(Signal::new(id.clone(), signal_kinds::VIOLATION, -0.4, t0()))
        .await
        .unwrap();

    engine.forget(&id).await.unwrap();
    let profile = engine.get_profile(&id);
    assert_eq!(profile.score, 0.5);
    assert!(profile.event_log.is_empty());

    let outcome = engine
        .ingest(Signal::new(id.clone(), signal_kinds::VIOLATION, -0.1, t0()))
        .await
        .unwrap();
    assert_eq!(outcome.before, 0.5);
}

#[tokio::test]
async fn profiles_survive_restart_on_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = WardenConfig::default();
    config.storage.backend = StorageBackend::Sqlite;
    config.storage.db_path = Some(dir.path().join("warden.db"));
    let id = PrincipalId::from("veteran");

    {
        let backend = warden_storage::open_store(&config.storage).unwrap();
        let engine = TrustEngine::bootstrap(config.clone(), backend, None)
            .await
            .unwrap();
        engine
            .ingest(Signal::new(id.clone(), signal_kinds::ENDORSEMENT, 1.0, t0()))
            .await
            .unwrap();
    }

    let backend = warden_storage::open_store(&config.storage).unwrap();
    let engine = TrustEngine::bootstrap(config, backend, None).await.unwrap();

    // Warmed from disk before any signal arrives.
    assert!(engine.has_capability(&id, "security_subscribe"));
    assert!(engine.subscribe(&id, Topic::SECURITY).await.is_ok());

    let profile = engine.get_profile(&id);
    assert_eq!(profile.score, 1.0);
    assert_eq!(profile.last_event_at, Some(t0()));
    assert_eq!(profile.event_log[0].source, EventSource::signal("endorsement"));
}
