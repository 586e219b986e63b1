use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use warden_core::config::WardenConfig;
use warden_core::models::{signal_kinds, PrincipalId, Signal, TrustProfile};
use warden_trust::{CapabilitySynchronizer, ScoreEngine};

fn engine() -> ScoreEngine {
    let config = WardenConfig::default();
    ScoreEngine::new(&config.trust, &config.decay)
}

fn synchronizer() -> CapabilitySynchronizer {
    CapabilitySynchronizer::new(WardenConfig::default().trust.capability_thresholds)
}

fn kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just(signal_kinds::VIOLATION),
        Just(signal_kinds::POLICY_BREACH),
        Just(signal_kinds::ENDORSEMENT),
        Just(signal_kinds::TASK_SUCCESS),
        Just(signal_kinds::TASK_FAILURE),
    ]
}

fn profile(score: f64, last_event_secs: Option<i64>) -> TrustProfile {
    let mut p = TrustProfile::baseline(PrincipalId::from("prop"), score, Default::default());
    p.last_event_at = last_event_secs.map(|s| Utc.timestamp_opt(s, 0).unwrap());
    p
}

proptest! {
    #[test]
    fn signal_scores_stay_in_bounds(
        start in 0.0f64..=1.0,
        signals in prop::collection::vec((kind(), -1.0f64..=1.0), 0..40),
    ) {
        let engine = engine();
        let mut p = profile(start, None);
        for (i, (kind, magnitude)) in signals.into_iter().enumerate() {
            let at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
            p = engine.signal_profile(&p, &Signal::new("prop", kind, magnitude, at));
            prop_assert!((0.0..=1.0).contains(&p.score), "score {} escaped", p.score);
        }
    }

    #[test]
    fn decay_stays_between_score_and_baseline(
        score in 0.0f64..=1.0,
        elapsed_secs in 0i64..=(400 * 86_400),
    ) {
        let engine = engine();
        let base = 1_700_000_000;
        let p = profile(score, Some(base));
        let next = engine.apply_decay(&p, Utc.timestamp_opt(base, 0).unwrap() + Duration::seconds(elapsed_secs));

        let (lo, hi) = if score < engine.baseline() { (score, engine.baseline()) } else { (engine.baseline(), score) };
        prop_assert!(next >= lo - 1e-12 && next <= hi + 1e-12, "{} not in [{}, {}]", next, lo, hi);
    }

    #[test]
    fn zero_elapsed_decay_is_identity(score in 0.0f64..=1.0) {
        let engine = engine();
        let p = profile(score, Some(1_700_000_000));
        prop_assert_eq!(engine.apply_decay(&p, Utc.timestamp_opt(1_700_000_000, 0).unwrap()), score);
    }

    #[test]
    fn repeated_decay_at_same_instant_is_idempotent(
        score in 0.0f64..=1.0,
        elapsed_secs in 1i64..=(60 * 86_400),
    ) {
        let engine = engine();
        let p = profile(score, Some(1_700_000_000));
        let now = Utc.timestamp_opt(1_700_000_000 + elapsed_secs, 0).unwrap();
        if let Some(once) = engine.decay_profile(&p, now) {
            prop_assert!(engine.decay_profile(&once, now).is_none());
        }
    }

    #[test]
    fn derived_capabilities_are_monotonic(a in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let sync = synchronizer();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(sync.derive(lo).is_subset(&sync.derive(hi)));
    }

    #[test]
    fn reconcile_settles_in_one_pass(from in 0.0f64..=1.0, to in 0.0f64..=1.0) {
        let sync = synchronizer();
        let current = TrustProfile::baseline(PrincipalId::from("prop"), from, sync.derive(from));
        let mut next = current.clone();
        next.score = to;

        let first = sync.reconcile(&current, &next);
        prop_assert_eq!(&first.settled, &sync.derive(to));
        for tag in &first.granted {
            prop_assert!(!current.capability_set.contains(tag));
        }

        next.capability_set = first.settled.clone();
        prop_assert!(sync.reconcile(&next, &next).is_empty());
    }
}
