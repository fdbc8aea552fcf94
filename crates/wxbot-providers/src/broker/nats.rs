//! NATS JetStream broker
//!
//! Each topic is a JetStream stream named after the topic. Partition `p`
//! of topic `t` is the subject `t.p`; a record's offset is its stream
//! sequence. A publish counts as delivered once JetStream acknowledges it,
//! which happens after the stream's replicas have stored the message.
//!
//! ## Example
//!
//! ```ignore
//! use wxbot_providers::broker::NatsBroker;
//!
//! let topics = BTreeMap::from([("weather-updates".to_string(), 3)]);
//! let broker = NatsBroker::connect("nats://localhost:4222", topics, 5).await?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_nats::jetstream;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::broker::{
    BrokerConsumerProvider, BrokerProducerProvider, DeliveryFuture, PartitionStream,
};
use wxbot_domain::{InboundRecord, OutboundMessage, RecordMetadata};

use super::{ensure_consumer_open, validate_topics};
use crate::constants::NATS_PARTITION_SEPARATOR;

/// Subject carrying one partition of a topic
fn partition_subject(topic: &str, partition: i32) -> String {
    format!("{topic}{NATS_PARTITION_SEPARATOR}{partition}")
}

/// Partition count and round-robin cursor of one topic
struct TopicRoute {
    partitions: i32,
    next: AtomicUsize,
}

impl TopicRoute {
    fn next_partition(&self) -> i32 {
        let slot = self.next.fetch_add(1, Ordering::Relaxed);
        let count = usize::try_from(self.partitions).unwrap_or(1).max(1);
        i32::try_from(slot % count).unwrap_or(0)
    }
}

/// Broker client backed by NATS JetStream
pub struct NatsBroker {
    client: async_nats::Client,
    jetstream: jetstream::Context,
    topics: HashMap<String, TopicRoute>,
    max_retries: u32,
    producer_closed: AtomicBool,
    consumer_closed: AtomicBool,
}

impl NatsBroker {
    /// Connect and make sure a stream exists for every topic
    ///
    /// `max_retries` bounds how often a publish is re-sent after JetStream
    /// fails to acknowledge it.
    pub async fn connect(
        url: &str,
        topics: BTreeMap<String, i32>,
        max_retries: u32,
    ) -> Result<Self> {
        validate_topics(&topics)?;
        debug!("Connecting to NATS server: {}", url);

        let client = async_nats::connect(url).await.map_err(|e| {
            Error::subscription(format!("Failed to connect to NATS at {url}: {e}"))
        })?;
        let jetstream = jetstream::new(client.clone());

        for topic in topics.keys() {
            Self::ensure_stream_exists(&jetstream, topic).await?;
        }

        info!(url, topics = ?topics, "Connected to NATS JetStream");

        let topics = topics
            .into_iter()
            .map(|(topic, partitions)| {
                let route = TopicRoute {
                    partitions,
                    next: AtomicUsize::new(0),
                };
                (topic, route)
            })
            .collect();

        Ok(Self {
            client,
            jetstream,
            topics,
            max_retries,
            producer_closed: AtomicBool::new(false),
            consumer_closed: AtomicBool::new(false),
        })
    }

    /// Create the stream for `topic` if it doesn't exist
    async fn ensure_stream_exists(jetstream: &jetstream::Context, topic: &str) -> Result<()> {
        jetstream
            .get_or_create_stream(jetstream::stream::Config {
                name: topic.to_string(),
                subjects: vec![format!("{topic}{NATS_PARTITION_SEPARATOR}*")],
                retention: jetstream::stream::RetentionPolicy::Limits,
                discard: jetstream::stream::DiscardPolicy::Old,
                ..Default::default()
            })
            .await
            .map_err(|e| {
                Error::subscription(format!("Failed to create JetStream stream '{topic}': {e}"))
            })?;
        debug!("JetStream stream '{}' ready", topic);
        Ok(())
    }

    fn route(&self, topic: &str) -> Option<&TopicRoute> {
        self.topics.get(topic)
    }
}

#[async_trait]
impl BrokerProducerProvider for NatsBroker {
    async fn enqueue(&self, message: OutboundMessage) -> Result<DeliveryFuture> {
        if self.producer_closed.load(Ordering::Acquire) {
            return Err(Error::delivery("producer is closed"));
        }
        let route = self
            .route(&message.topic)
            .ok_or_else(|| Error::delivery(format!("unknown topic '{}'", message.topic)))?;

        let partition = route.next_partition();
        let subject = partition_subject(&message.topic, partition);
        let OutboundMessage { topic, payload } = message;

        let mut pending = self
            .jetstream
            .publish(subject.clone(), payload.clone().into())
            .await
            .map_err(|e| Error::delivery(format!("Failed to publish to '{subject}': {e}")))?;

        let jetstream = self.jetstream.clone();
        let max_retries = self.max_retries;

        Ok(Box::pin(async move {
            let mut attempt = 0;
            loop {
                match pending.await {
                    Ok(ack) => {
                        return Ok(RecordMetadata {
                            topic,
                            partition,
                            offset: i64::try_from(ack.sequence).unwrap_or(i64::MAX),
                        });
                    }
                    Err(e) if attempt < max_retries => {
                        attempt += 1;
                        warn!(%subject, attempt, error = %e, "Publish not acknowledged, retrying");
                        pending = jetstream
                            .publish(subject.clone(), payload.clone().into())
                            .await
                            .map_err(|e| {
                                Error::delivery(format!("Failed to publish to '{subject}': {e}"))
                            })?;
                    }
                    Err(e) => {
                        return Err(Error::delivery(format!(
                            "'{subject}' not acknowledged after {attempt} retries: {e}"
                        )));
                    }
                }
            }
        }))
    }

    async fn close(&self) -> Result<()> {
        if self.producer_closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.client
            .flush()
            .await
            .map_err(|e| Error::close(format!("Failed to flush NATS connection: {e}")))?;
        info!("NATS producer closed");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "nats"
    }
}

#[async_trait]
impl BrokerConsumerProvider for NatsBroker {
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>> {
        ensure_consumer_open(&self.consumer_closed)?;
        let route = self
            .route(topic)
            .ok_or_else(|| Error::subscription(format!("unknown topic '{topic}'")))?;

        self.jetstream.get_stream(topic).await.map_err(|e| {
            Error::subscription(format!("JetStream stream '{topic}' is unavailable: {e}"))
        })?;

        Ok((0..route.partitions).collect())
    }

    async fn open_partition(&self, topic: &str, partition: i32) -> Result<PartitionStream> {
        ensure_consumer_open(&self.consumer_closed)?;
        let subject = partition_subject(topic, partition);

        let consumer = self
            .jetstream
            .create_consumer_on_stream(
                jetstream::consumer::pull::Config {
                    durable_name: None,
                    filter_subject: subject.clone(),
                    deliver_policy: jetstream::consumer::DeliverPolicy::New,
                    ack_policy: jetstream::consumer::AckPolicy::None,
                    ..Default::default()
                },
                topic,
            )
            .await
            .map_err(|e| {
                Error::subscription(format!("Failed to create consumer for '{subject}': {e}"))
            })?;

        let messages = consumer.stream().messages().await.map_err(|e| {
            Error::subscription(format!("Failed to read from '{subject}': {e}"))
        })?;

        debug!(%subject, "Partition stream opened");

        let topic = topic.to_string();
        let records = messages.map(move |item| match item {
            Ok(message) => message
                .info()
                .map(|info| InboundRecord {
                    topic: topic.clone(),
                    partition,
                    offset: i64::try_from(info.stream_sequence).unwrap_or(i64::MAX),
                    payload: message.message.payload.to_vec(),
                })
                .map_err(|e| Error::subscription(format!("Malformed JetStream reply: {e}"))),
            Err(e) => Err(Error::subscription(format!(
                "Partition {partition} of '{topic}' failed: {e}"
            ))),
        });

        Ok(Box::pin(records))
    }

    async fn close(&self) -> Result<()> {
        if self.consumer_closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.client
            .flush()
            .await
            .map_err(|e| Error::close(format!("Failed to flush NATS connection: {e}")))?;
        info!("NATS consumer closed");
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "nats"
    }
}

impl std::fmt::Debug for NatsBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut topics: Vec<&String> = self.topics.keys().collect();
        topics.sort();
        f.debug_struct("NatsBroker")
            .field("topics", &topics)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
