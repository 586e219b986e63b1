use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A signal bus topic name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(Cow<'static, str>);

impl Topic {
    /// Raw behavioral signals feeding the trust engine.
    pub const TRUST_EVENTS: Topic = Topic(Cow::Borrowed("trust_events"));
    /// Before/after score notifications.
    pub const SCORE_EVENTS: Topic = Topic(Cow::Borrowed("score_events"));
    /// Capability grants and revocations.
    pub const CAPABILITY_EVENTS: Topic = Topic(Cow::Borrowed("capability_events"));
    pub const SECURITY: Topic = Topic(Cow::Borrowed("security"));
    pub const IDENTITY: Topic = Topic(Cow::Borrowed("identity"));
    /// General-purpose telemetry.
    pub const TELEMETRY: Topic = Topic(Cow::Borrowed("telemetry"));
    /// Receives every event published on any topic.
    pub const WILDCARD: Topic = Topic(Cow::Borrowed("*"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_wildcard(&self) -> bool {
        self.as_str() == "*"
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
