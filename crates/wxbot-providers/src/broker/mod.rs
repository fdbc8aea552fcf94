//! Message Broker Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`TokioBroker`] | Local | In-process topics backed by tokio channels |
//! | [`NatsBroker`] | Distributed | NATS JetStream streams, one subject per partition |
//!
//! Both implement the producer and consumer ports on the same value, so one
//! client can back a `MessageProducer` and a `MessageConsumer`.

pub mod tokio;
#[cfg(feature = "broker-nats")]
pub mod nats;

pub use self::tokio::{TokioBroker, TokioBrokerConfig};
#[cfg(feature = "broker-nats")]
pub use nats::NatsBroker;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use wxbot_domain::error::{Error, Result};

/// `Subscription` error once the consumer side has been closed
pub(crate) fn ensure_consumer_open(closed: &AtomicBool) -> Result<()> {
    if closed.load(Ordering::Acquire) {
        return Err(Error::subscription("consumer is closed"));
    }
    Ok(())
}

/// Reject topic layouts with no topics or a non-positive partition count
pub(crate) fn validate_topics(topics: &BTreeMap<String, i32>) -> Result<()> {
    if topics.is_empty() {
        return Err(Error::invalid_argument("Broker needs at least one topic"));
    }
    for (topic, partitions) in topics {
        if topic.trim().is_empty() {
            return Err(Error::invalid_argument("Topic names cannot be blank"));
        }
        if *partitions <= 0 {
            return Err(Error::invalid_argument(format!(
                "Topic '{topic}' must have at least one partition, got {partitions}"
            )));
        }
    }
    Ok(())
}
