//! Message producer
//!
//! One `produce` call ends in exactly one outcome:
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Ok(RecordMetadata)` | broker acknowledged |
//! | `Delivery` | broker rejected; definitely not delivered |
//! | `Timeout` | no answer in time; delivery status unknown |
//! | `Cancelled` | caller cancelled; success is never reported |
//!
//! Waiting for queue space has no deadline; only cancellation ends it. The
//! delivery timeout starts once the broker client has accepted the message
//! and bounds the wait for the acknowledgment.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::broker::BrokerProducerProvider;
use wxbot_domain::{OutboundMessage, RecordMetadata};

const OPERATION: &str = "produce";

/// Producer wrapper owning a broker client
pub struct MessageProducer {
    provider: Arc<dyn BrokerProducerProvider>,
    delivery_timeout: Duration,
    closed: AtomicBool,
}

impl MessageProducer {
    /// Wrap `provider`; `delivery_timeout` must be non-zero
    ///
    /// Acknowledgment level and retries are properties of the provider.
    pub fn new(
        provider: Arc<dyn BrokerProducerProvider>,
        delivery_timeout: Duration,
    ) -> Result<Self> {
        if delivery_timeout.is_zero() {
            return Err(Error::invalid_argument(
                "Delivery timeout must be greater than zero",
            ));
        }
        Ok(Self {
            provider,
            delivery_timeout,
            closed: AtomicBool::new(false),
        })
    }

    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Send `payload` to `topic` and wait for the outcome
    pub async fn produce(
        &self,
        cancel: &CancellationToken,
        payload: impl Into<Vec<u8>>,
        topic: &str,
    ) -> Result<RecordMetadata> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::delivery("producer is closed"));
        }

        let message = OutboundMessage::new(topic, payload);

        let delivery = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::cancelled(OPERATION)),
            queued = self.provider.enqueue(message) => queued?,
        };

        let deadline = Instant::now() + self.delivery_timeout;

        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::cancelled(OPERATION)),
            outcome = delivery => outcome,
            () = sleep_until(deadline) => return Err(self.timed_out(topic)),
        };

        match outcome {
            Ok(metadata) => {
                debug!(
                    topic = %metadata.topic,
                    partition = metadata.partition,
                    offset = metadata.offset,
                    "Message delivered"
                );
                Ok(metadata)
            }
            Err(e @ Error::Delivery { .. }) => Err(e),
            Err(e) => Err(Error::delivery_with_source(
                format!("broker rejected message for '{topic}'"),
                e,
            )),
        }
    }

    fn timed_out(&self, topic: &str) -> Error {
        warn!(
            topic,
            timeout = ?self.delivery_timeout,
            "No delivery acknowledgment in time, status unknown"
        );
        Error::timeout(OPERATION, self.delivery_timeout)
    }

    /// Flush and release the broker client; later calls are no-ops
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.provider.close().await?;
        info!(provider = self.provider.provider_name(), "Producer closed");
        Ok(())
    }
}

impl std::fmt::Debug for MessageProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageProducer")
            .field("provider", &self.provider.provider_name())
            .field("delivery_timeout", &self.delivery_timeout)
            .finish_non_exhaustive()
    }
}
