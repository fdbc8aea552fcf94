//! Message broker configuration types

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use wxbot_domain::constants::{DEFAULT_DELIVERY_TIMEOUT_MS, DEFAULT_PRODUCER_MAX_RETRIES};

use wxbot_providers::constants::BROKER_DEFAULT_QUEUE_CAPACITY;

use crate::constants::{DEFAULT_TOPIC_PARTITIONS, DEFAULT_WEATHER_TOPIC};

/// Broker backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrokerBackend {
    /// In-process topics
    #[default]
    Tokio,
    /// NATS JetStream (requires the `broker-nats` feature)
    Nats,
    /// No producer or consumer is started
    Disabled,
}

/// Message broker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    pub provider: BrokerBackend,

    /// NATS server URL (for the NATS backend)
    pub nats_url: Option<String>,

    /// Topic name to partition count
    pub topics: BTreeMap<String, i32>,

    /// Topics the consumer subscribes to
    pub consume_topics: Vec<String>,

    /// Topic receiving a report after every refresh sweep
    pub notify_topic: Option<String>,

    /// Broker-side publish retries
    pub max_retries: u32,

    /// Per-message delivery timeout in milliseconds
    pub delivery_timeout_ms: u64,

    /// Send queue capacity (in-process backend)
    pub queue_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            provider: BrokerBackend::default(),
            nats_url: None,
            topics: BTreeMap::from([(DEFAULT_WEATHER_TOPIC.to_string(), DEFAULT_TOPIC_PARTITIONS)]),
            consume_topics: vec![DEFAULT_WEATHER_TOPIC.to_string()],
            notify_topic: Some(DEFAULT_WEATHER_TOPIC.to_string()),
            max_retries: DEFAULT_PRODUCER_MAX_RETRIES,
            delivery_timeout_ms: DEFAULT_DELIVERY_TIMEOUT_MS,
            queue_capacity: BROKER_DEFAULT_QUEUE_CAPACITY,
        }
    }
}

impl BrokerConfig {
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }

    pub fn is_enabled(&self) -> bool {
        self.provider != BrokerBackend::Disabled
    }
}
