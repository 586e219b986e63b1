// Single source of truth for all default values.

// --- Trust ---
pub const DEFAULT_BASELINE_SCORE: f64 = 0.5;
pub const DEFAULT_EVENT_LOG_HORIZON_SECS: u64 = 30 * 86_400; // 30 days
pub const DEFAULT_EVENT_LOG_MAX_ENTRIES: usize = 512;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_STORE_MAX_RETRIES: u32 = 3;
pub const DEFAULT_STORE_RETRY_BACKOFF_MS: u64 = 25;
pub const DEFAULT_INGESTION_WORKERS: usize = 4;

/// Signal kind → weight multiplier.
pub const DEFAULT_KIND_WEIGHTS: &[(&str, f64)] = &[
    ("violation", 1.0),
    ("policy_breach", 1.5),
    ("endorsement", 0.5),
    ("task_success", 0.2),
    ("task_failure", 0.3),
];

/// Capability tag → minimum score.
pub const DEFAULT_CAPABILITY_THRESHOLDS: &[(&str, f64)] = &[
    ("basic_access", 0.3),
    ("capability_subscribe", 0.6),
    ("trusted", 0.7),
    ("identity_subscribe", 0.8),
    ("security_subscribe", 0.85),
    ("wildcard_subscribe", 0.95),
];

// --- Decay ---
pub const DEFAULT_HALF_LIFE_SECS: u64 = 7 * 86_400; // 7 days
pub const DEFAULT_DECAY_INTERVAL_SECS: u64 = 3_600; // 1 hour
pub const DEFAULT_DECAY_ENABLED: bool = true;

// --- Bus ---
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;
pub const DEFAULT_PIPELINE_TIMEOUT_MS: u64 = 2_000;

/// Restricted topic → capability tag required to subscribe.
pub const DEFAULT_RESTRICTED_TOPICS: &[(&str, &str)] = &[
    ("security", "security_subscribe"),
    ("identity", "identity_subscribe"),
    ("capability_events", "capability_subscribe"),
    ("*", "wildcard_subscribe"),
];

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "warden.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
