use std::collections::BTreeSet;

use chrono::{Duration, TimeZone, Utc};
use warden_core::models::*;

fn entry(minutes: i64) -> EventLogEntry {
    EventLogEntry {
        at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minutes),
        source: EventSource::signal("violation"),
        delta: -0.1,
    }
}

#[test]
fn baseline_profile_has_no_history() {
    let caps: BTreeSet<String> = ["basic_access".to_string()].into();
    let profile = TrustProfile::baseline(PrincipalId::from("p1"), 0.5, caps);
    assert_eq!(profile.score, 0.5);
    assert!(profile.last_event_at.is_none());
    assert!(profile.event_log.is_empty());
    assert!(profile.has_capability("basic_access"));
}

#[test]
fn storage_key_roundtrips_principal() {
    let id = PrincipalId::from("agent:42");
    let key = TrustProfile::storage_key(&id);
    assert_eq!(key, "trust_profile/agent:42");
    assert_eq!(TrustProfile::principal_from_key(&key), Some(id));
    assert_eq!(TrustProfile::principal_from_key("other/agent:42"), None);
    assert_eq!(TrustProfile::principal_from_key("trust_profile/"), None);
}

#[test]
fn event_log_prunes_entries_past_horizon() {
    let mut profile = TrustProfile::baseline(PrincipalId::from("p1"), 0.5, BTreeSet::new());
    for m in [0, 10, 20, 30] {
        profile.record_event(entry(m), Duration::minutes(15), 100);
    }
    let kept: Vec<_> = profile.event_log.iter().map(|e| e.at).collect();
    assert_eq!(kept, vec![entry(20).at, entry(30).at]);
}

#[test]
fn event_log_horizon_before_min_time_keeps_everything() {
    let mut profile = TrustProfile::baseline(PrincipalId::from("p1"), 0.5, BTreeSet::new());
    let oldest = EventLogEntry {
        at: chrono::DateTime::<Utc>::MIN_UTC,
        source: EventSource::signal("violation"),
        delta: -0.1,
    };
    profile.record_event(oldest.clone(), Duration::days(365), 10);
    profile.record_event(
        EventLogEntry {
            at: oldest.at + Duration::days(1),
            ..oldest.clone()
        },
        Duration::days(365),
        10,
    );
    assert_eq!(profile.event_log.len(), 2);
    assert_eq!(profile.event_log[0], oldest);
}

#[test]
fn event_log_caps_length_keeping_newest() {
    let mut profile = TrustProfile::baseline(PrincipalId::from("p1"), 0.5, BTreeSet::new());
    for m in 0..10 {
        profile.record_event(entry(m), Duration::days(1), 3);
    }
    assert_eq!(profile.event_log.len(), 3);
    assert_eq!(profile.event_log[0].at, entry(7).at);
}

#[test]
fn topic_constants_and_wildcard() {
    assert_eq!(Topic::TRUST_EVENTS.as_str(), "trust_events");
    assert!(Topic::WILDCARD.is_wildcard());
    assert!(!Topic::SECURITY.is_wildcard());
    assert_eq!(Topic::new("security"), Topic::SECURITY);
}

#[test]
fn bus_event_serializes_with_tag() {
    let event = BusEvent::Capability(CapabilityEvent {
        principal_id: PrincipalId::from("p2"),
        tag: "trusted".into(),
        action: CapabilityAction::Granted,
        at: Utc::now(),
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "capability");
    assert_eq!(json["action"], "granted");
    assert_eq!(event.principal().map(PrincipalId::as_str), Some("p2"));

    let back: BusEvent = serde_json::from_value(json).unwrap();
    assert_eq!(back, event);
}

#[test]
fn profile_json_roundtrip_preserves_event_sources() {
    let mut profile = TrustProfile::baseline(PrincipalId::from("p3"), 0.5, BTreeSet::new());
    profile.record_event(
        EventLogEntry { at: Utc::now(), source: EventSource::Decay, delta: 0.01 },
        Duration::days(30),
        10,
    );
    let bytes = serde_json::to_vec(&profile).unwrap();
    let back: TrustProfile = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(back.event_log[0].source, EventSource::Decay);
    assert_eq!(back.event_log[0].source.label(), "decay");
}
