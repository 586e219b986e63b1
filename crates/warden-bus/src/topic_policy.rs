//! Topic classification.
//!
//! Restricted topics name the capability tag a principal must hold to
//! subscribe. Every topic not listed is open.

use std::collections::HashMap;

use warden_core::config::BusConfig;
use warden_core::models::Topic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicClass<'a> {
    /// Any principal may subscribe.
    Open,
    /// Subscription requires `required_tag`.
    Restricted { required_tag: &'a str },
}

#[derive(Debug, Clone, Default)]
pub struct TopicPolicy {
    restricted: HashMap<Topic, String>,
}

impl TopicPolicy {
    pub fn new(restricted: impl IntoIterator<Item = (Topic, String)>) -> Self {
        Self {
            restricted: restricted.into_iter().collect(),
        }
    }

    pub fn from_config(config: &BusConfig) -> Self {
        Self::new(
            config
                .restricted_topics
                .iter()
                .map(|(topic, tag)| (Topic::new(topic.as_str()), tag.clone())),
        )
    }

    pub fn classify(&self, topic: &Topic) -> TopicClass<'_> {
        match self.restricted.get(topic) {
            Some(tag) => TopicClass::Restricted { required_tag: tag },
            None => TopicClass::Open,
        }
    }
}
