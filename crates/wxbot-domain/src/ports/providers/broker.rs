//! Message Broker Ports
//!
//! Client-side contracts for a topic/partition broker. A producer hands a
//! message over and receives a future for the broker's acknowledgment; a
//! consumer opens one read stream per partition starting at the newest
//! offset.
//!
//! Acknowledgment level and retry count are fixed when a provider is
//! constructed, never per call.

use crate::entities::{InboundRecord, OutboundMessage, RecordMetadata};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::Stream;
use std::future::Future;
use std::pin::Pin;

/// Resolves once the broker has acknowledged or rejected a message
///
/// `Err` means the message was definitely not delivered. A future that
/// never resolves models a broker that never acknowledges.
pub type DeliveryFuture = Pin<Box<dyn Future<Output = Result<RecordMetadata>> + Send>>;

/// Records (or read errors) from a single partition, in broker order
pub type PartitionStream = Pin<Box<dyn Stream<Item = Result<InboundRecord>> + Send>>;

/// Producer side of a broker client
#[async_trait]
pub trait BrokerProducerProvider: Send + Sync {
    /// Hand a message to the client's send queue
    ///
    /// Returns once the message is queued, not once it is delivered. The
    /// returned future carries the delivery outcome.
    async fn enqueue(&self, message: OutboundMessage) -> Result<DeliveryFuture>;

    /// Flush queued messages and release broker resources
    async fn close(&self) -> Result<()>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}

/// Consumer side of a broker client
#[async_trait]
pub trait BrokerConsumerProvider: Send + Sync {
    /// List the partitions of a topic
    ///
    /// Fails with `Subscription` when the topic is unknown or unreachable.
    async fn partitions(&self, topic: &str) -> Result<Vec<i32>>;

    /// Open a read stream for one partition, starting at the newest offset
    async fn open_partition(&self, topic: &str, partition: i32) -> Result<PartitionStream>;

    /// Release every open stream and the underlying connection
    async fn close(&self) -> Result<()>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}

/// Callback invoked by the consumer for every inbound record
///
/// The record is only borrowed for the duration of the call.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Process one record
    async fn handle(&self, record: &InboundRecord);

    /// Observe a partition read error
    ///
    /// The consumer has already logged the error when this is called.
    async fn on_error(&self, _error: &Error) {}
}

/// [`RecordHandler`] backed by an async closure, see [`handler_fn`]
pub struct FnHandler<F> {
    f: F,
}

/// Adapt an async closure into a [`RecordHandler`]
///
/// # Example
///
/// ```
/// use wxbot_domain::ports::providers::broker::handler_fn;
/// use wxbot_domain::InboundRecord;
///
/// let handler = handler_fn(|record: InboundRecord| async move {
///     let _ = record.offset;
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(InboundRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RecordHandler for FnHandler<F>
where
    F: Fn(InboundRecord) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, record: &InboundRecord) {
        (self.f)(record.clone()).await;
    }
}
