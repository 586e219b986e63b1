use warden_core::config::ObservabilityConfig;
use warden_observability::init_from_config;
use warden_observability::tracing_setup::spans::names;

#[test]
fn second_initialization_reports_existing_subscriber() {
    let config = ObservabilityConfig {
        log_level: "debug".to_string(),
        json_logs: false,
    };
    assert!(init_from_config(&config));
    assert!(!init_from_config(&config));

    let span = warden_observability::decay_span!(3usize);
    assert_eq!(span.metadata().map(|m| m.name()), Some(names::DECAY));
}
