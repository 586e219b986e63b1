//! Test fixture loader for Warden trust scenarios.
//!
//! Scenarios are JSON files under this crate's directory. Each one replays a
//! sequence of signals and decay sweeps against a fresh engine and states the
//! score and capability set expected after every step.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root directory of the fixture files.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioFile {
    pub scenarios: Vec<TrustScenario>,
}

/// One replayable trust history.
#[derive(Debug, Clone, Deserialize)]
pub struct TrustScenario {
    pub name: String,
    pub principal: String,
    /// Time zero for `at_secs` offsets.
    pub epoch: DateTime<Utc>,
    /// Replaces the default threshold table when present.
    #[serde(default)]
    pub capability_thresholds: Option<BTreeMap<String, f64>>,
    pub steps: Vec<ScenarioStep>,
}

impl TrustScenario {
    pub fn at(&self, offset_secs: i64) -> DateTime<Utc> {
        self.epoch + Duration::seconds(offset_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScenarioStep {
    Signal {
        kind: String,
        magnitude: f64,
        at_secs: i64,
        expect: Expectation,
    },
    Decay {
        at_secs: i64,
        expect: Expectation,
    },
}

impl ScenarioStep {
    pub fn expect(&self) -> &Expectation {
        match self {
            Self::Signal { expect, .. } | Self::Decay { expect, .. } => expect,
        }
    }
}

/// State expected after a step.
#[derive(Debug, Clone, Deserialize)]
pub struct Expectation {
    pub score: f64,
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub granted: Vec<String>,
    #[serde(default)]
    pub revoked: Vec<String>,
}

/// All scenarios in `trust/scenarios.json`.
pub fn trust_scenarios() -> Vec<TrustScenario> {
    load_fixture::<ScenarioFile>("trust/scenarios.json").scenarios
}
