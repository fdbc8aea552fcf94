//! Test doubles for broker and weather ports

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::ports::providers::broker::{
    BrokerConsumerProvider, BrokerProducerProvider, DeliveryFuture, PartitionStream,
};
use wxbot_domain::{Coordinates, OutboundMessage, Snapshot};

/// How [`ScriptedProducer`] answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ack {
    /// Delivery future never resolves
    Never,
    /// Delivery future resolves with a broker error
    Reject,
    /// `enqueue` itself never returns (send queue full)
    QueueFull,
    /// `enqueue` waits this long for queue space, then the ack never comes
    SlowQueue(Duration),
}

pub struct ScriptedProducer {
    pub ack: Ack,
    pub enqueued: AtomicUsize,
    pub closed: AtomicBool,
}

impl ScriptedProducer {
    pub fn new(ack: Ack) -> Self {
        Self {
            ack,
            enqueued: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BrokerProducerProvider for ScriptedProducer {
    async fn enqueue(&self, _message: OutboundMessage) -> Result<DeliveryFuture> {
        match self.ack {
            Ack::QueueFull => std::future::pending().await,
            Ack::SlowQueue(wait) => {
                tokio::time::sleep(wait).await;
                self.enqueued.fetch_add(1, Ordering::SeqCst);
                Ok(Box::pin(std::future::pending()))
            }
            Ack::Never => {
                self.enqueued.fetch_add(1, Ordering::SeqCst);
                Ok(Box::pin(std::future::pending()))
            }
            Ack::Reject => {
                self.enqueued.fetch_add(1, Ordering::SeqCst);
                Ok(Box::pin(async {
                    Err(Error::delivery("Broker: Message size too large"))
                }))
            }
        }
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Consumer whose partitions fail to open or whose close fails
pub struct BrokenConsumer {
    /// Partition index that refuses to open
    pub failing_partition: Option<i32>,
    pub fail_close: bool,
    pub opened: AtomicUsize,
}

#[async_trait]
impl BrokerConsumerProvider for BrokenConsumer {
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>> {
        if topic == "weather-updates" {
            Ok(vec![0, 1, 2])
        } else {
            Err(Error::subscription(format!("unknown topic '{topic}'")))
        }
    }

    async fn open_partition(&self, _topic: &str, partition: i32) -> Result<PartitionStream> {
        if Some(partition) == self.failing_partition {
            return Err(Error::internal("leader not available"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::pin(futures::stream::pending()))
    }

    async fn close(&self) -> Result<()> {
        if self.fail_close {
            Err(Error::internal("connection already torn down"))
        } else {
            Ok(())
        }
    }

    fn provider_name(&self) -> &str {
        "broken"
    }
}

/// Weather provider with canned snapshots; unknown places fail
#[derive(Default)]
pub struct CannedWeather {
    places: HashMap<String, Snapshot>,
}

impl CannedWeather {
    pub fn with_place(mut self, name: &str, snapshot: Snapshot) -> Self {
        self.places.insert(name.to_string(), snapshot);
        self
    }

    fn coordinates_of(name: &str) -> Coordinates {
        let seed = f64::from(name.chars().map(u32::from).sum::<u32>());
        Coordinates::new(seed, -seed)
    }
}

#[async_trait]
impl WeatherProvider for CannedWeather {
    async fn resolve_coordinates(&self, name: &str) -> Result<Coordinates> {
        if self.places.contains_key(name) {
            Ok(Self::coordinates_of(name))
        } else {
            Err(Error::provider(format!("geocoding failed for {name}")))
        }
    }

    async fn fetch_snapshot(&self, coordinates: Coordinates) -> Result<Snapshot> {
        self.places
            .iter()
            .find(|(name, _)| Self::coordinates_of(name) == coordinates)
            .map(|(_, snapshot)| snapshot.clone())
            .ok_or_else(|| Error::provider("no data"))
    }

    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Snapshot>> {
        Ok(vec![self.fetch_snapshot(coordinates).await?])
    }

    fn provider_name(&self) -> &str {
        "canned"
    }
}
