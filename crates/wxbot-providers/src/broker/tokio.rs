//! In-process message broker
//!
//! Topics and their partition counts are fixed at construction. Produced
//! messages go through a bounded send queue drained by a dispatcher task,
//! which assigns partitions round-robin, stamps per-partition offsets and
//! then acknowledges. Each partition is a broadcast channel: a reader sees
//! only records published after it subscribed, and a reader that falls
//! more than `partition_buffer` records behind gets a lag error.
//!
//! ## Example
//!
//! ```ignore
//! use wxbot_providers::broker::{TokioBroker, TokioBrokerConfig};
//!
//! let broker = TokioBroker::start(TokioBrokerConfig::new().with_topic("weather", 3))?;
//! let delivery = broker.enqueue(OutboundMessage::new("weather", b"{}".to_vec())).await?;
//! let metadata = delivery.await?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::stream;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::broker::{
    BrokerConsumerProvider, BrokerProducerProvider, DeliveryFuture, PartitionStream,
};
use wxbot_domain::{InboundRecord, OutboundMessage, RecordMetadata};

use super::{ensure_consumer_open, validate_topics};
use crate::constants::{BROKER_DEFAULT_PARTITION_BUFFER, BROKER_DEFAULT_QUEUE_CAPACITY};

/// Topic layout and buffer sizes for [`TokioBroker`]
#[derive(Debug, Clone)]
pub struct TokioBrokerConfig {
    /// Topic name to partition count
    pub topics: BTreeMap<String, i32>,
    /// Messages accepted before `enqueue` waits for the dispatcher
    pub queue_capacity: usize,
    /// Records buffered per partition before a slow reader lags
    pub partition_buffer: usize,
}

impl Default for TokioBrokerConfig {
    fn default() -> Self {
        Self {
            topics: BTreeMap::new(),
            queue_capacity: BROKER_DEFAULT_QUEUE_CAPACITY,
            partition_buffer: BROKER_DEFAULT_PARTITION_BUFFER,
        }
    }
}

impl TokioBrokerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a topic with `partitions` partitions
    pub fn with_topic(mut self, topic: impl Into<String>, partitions: i32) -> Self {
        self.topics.insert(topic.into(), partitions);
        self
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn with_partition_buffer(mut self, partition_buffer: usize) -> Self {
        self.partition_buffer = partition_buffer;
        self
    }
}

type Partitions = HashMap<String, Vec<broadcast::Sender<InboundRecord>>>;

struct Pending {
    message: OutboundMessage,
    ack: oneshot::Sender<Result<RecordMetadata>>,
}

/// Round-robin partition choice and next offset per partition
struct TopicCursor {
    next_partition: usize,
    offsets: Vec<i64>,
}

impl TopicCursor {
    fn new(partitions: usize) -> Self {
        Self {
            next_partition: 0,
            offsets: vec![0; partitions],
        }
    }

    /// Claim the next (partition, offset) slot
    fn advance(&mut self) -> (usize, i64) {
        let partition = self.next_partition;
        self.next_partition = (partition + 1) % self.offsets.len();
        let offset = self.offsets[partition];
        self.offsets[partition] += 1;
        (partition, offset)
    }
}

struct Inner {
    partitions: Arc<Partitions>,
    queue: RwLock<Option<mpsc::Sender<Pending>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    consumer_closed: AtomicBool,
}

/// In-process broker implementing both broker ports
#[derive(Clone)]
pub struct TokioBroker {
    inner: Arc<Inner>,
}

impl TokioBroker {
    /// Create the topics and spawn the dispatcher task
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: TokioBrokerConfig) -> Result<Self> {
        validate_topics(&config.topics)?;
        if config.queue_capacity == 0 || config.partition_buffer == 0 {
            return Err(Error::invalid_argument(
                "Broker queue and partition buffers must be non-empty",
            ));
        }

        let partitions: Partitions = config
            .topics
            .iter()
            .map(|(topic, count)| {
                let senders = (0..*count)
                    .map(|_| broadcast::channel(config.partition_buffer).0)
                    .collect();
                (topic.clone(), senders)
            })
            .collect();
        let partitions = Arc::new(partitions);

        let (queue, receiver) = mpsc::channel(config.queue_capacity);
        let dispatcher = tokio::spawn(dispatch(receiver, Arc::clone(&partitions)));

        info!(topics = ?config.topics, "In-process broker started");

        Ok(Self {
            inner: Arc::new(Inner {
                partitions,
                queue: RwLock::new(Some(queue)),
                dispatcher: Mutex::new(Some(dispatcher)),
                consumer_closed: AtomicBool::new(false),
            }),
        })
    }

    /// Names of the configured topics
    pub fn topics(&self) -> Vec<String> {
        let mut topics: Vec<String> = self.inner.partitions.keys().cloned().collect();
        topics.sort();
        topics
    }

    fn sender(&self) -> Result<mpsc::Sender<Pending>> {
        self.inner
            .queue
            .read()
            .map_err(|_| Error::internal("Broker queue lock poisoned"))?
            .clone()
            .ok_or_else(|| Error::delivery("producer is closed"))
    }

    fn topic_partitions(&self, topic: &str) -> Result<&[broadcast::Sender<InboundRecord>]> {
        ensure_consumer_open(&self.inner.consumer_closed)?;
        self.inner
            .partitions
            .get(topic)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::subscription(format!("unknown topic '{topic}'")))
    }
}

/// Drain the send queue until every sender is gone
async fn dispatch(mut receiver: mpsc::Receiver<Pending>, partitions: Arc<Partitions>) {
    let mut cursors: HashMap<String, TopicCursor> = HashMap::new();

    while let Some(Pending { message, ack }) = receiver.recv().await {
        let outcome = match partitions.get(&message.topic) {
            None => Err(Error::delivery(format!(
                "unknown topic '{}'",
                message.topic
            ))),
            Some(senders) => {
                let cursor = cursors
                    .entry(message.topic.clone())
                    .or_insert_with(|| TopicCursor::new(senders.len()));
                let (index, offset) = cursor.advance();
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                let partition = index as i32;
                let metadata = RecordMetadata {
                    topic: message.topic.clone(),
                    partition,
                    offset,
                };
                // A partition with no readers still accepts the record
                let _ = senders[index].send(InboundRecord {
                    topic: message.topic,
                    partition,
                    offset,
                    payload: message.payload,
                });
                Ok(metadata)
            }
        };

        if ack.send(outcome).is_err() {
            debug!("Producer stopped waiting before acknowledgment");
        }
    }

    debug!("Broker send queue drained");
}

#[async_trait]
impl BrokerProducerProvider for TokioBroker {
    async fn enqueue(&self, message: OutboundMessage) -> Result<DeliveryFuture> {
        let queue = self.sender()?;
        let (ack, outcome) = oneshot::channel();

        queue
            .send(Pending { message, ack })
            .await
            .map_err(|_| Error::delivery("broker dispatcher stopped"))?;

        Ok(Box::pin(async move {
            outcome
                .await
                .map_err(|_| Error::delivery("broker dropped the message before acknowledging"))?
        }))
    }

    async fn close(&self) -> Result<()> {
        // Dropping the last sender lets the dispatcher drain and exit
        let queue = self
            .inner
            .queue
            .write()
            .map_err(|_| Error::close("Broker queue lock poisoned"))?
            .take();
        drop(queue);

        let dispatcher = self.inner.dispatcher.lock().await.take();
        if let Some(handle) = dispatcher {
            handle
                .await
                .map_err(|e| Error::close_with_source("Broker dispatcher failed", e))?;
            info!("In-process broker producer closed");
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "tokio"
    }
}

#[async_trait]
impl BrokerConsumerProvider for TokioBroker {
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>> {
        let count = self.topic_partitions(topic)?.len();
        (0..count)
            .map(|p| {
                i32::try_from(p).map_err(|_| Error::subscription("partition index out of range"))
            })
            .collect()
    }

    async fn open_partition(&self, topic: &str, partition: i32) -> Result<PartitionStream> {
        let senders = self.topic_partitions(topic)?;
        let sender = usize::try_from(partition)
            .ok()
            .and_then(|index| senders.get(index))
            .ok_or_else(|| {
                Error::subscription(format!("partition {partition} of '{topic}' does not exist"))
            })?;
        let receiver = sender.subscribe();

        let stream = stream::unfold(receiver, move |mut rx| async move {
            match rx.recv().await {
                Ok(record) => Some((Ok(record), rx)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(partition, skipped, "Partition reader lagged");
                    Some((
                        Err(Error::subscription(format!(
                            "partition {partition} reader lagged by {skipped} records"
                        ))),
                        rx,
                    ))
                }
                Err(broadcast::error::RecvError::Closed) => None,
            }
        });

        Ok(Box::pin(stream))
    }

    async fn close(&self) -> Result<()> {
        self.inner.consumer_closed.store(true, Ordering::Release);
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "tokio"
    }
}

impl std::fmt::Debug for TokioBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioBroker")
            .field("topics", &self.topics())
            .finish_non_exhaustive()
    }
}
