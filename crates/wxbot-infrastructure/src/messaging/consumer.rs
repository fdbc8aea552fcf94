//! Message consumer
//!
//! `consume` opens one read stream per partition of every requested topic,
//! all or nothing, then hands them to a background task that merges them
//! with `select_all`. The task parks until some partition yields a record
//! or an error, or until cancellation; it never polls in a loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::StreamExt;
use futures::stream::select_all;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::broker::{
    BrokerConsumerProvider, PartitionStream, RecordHandler,
};

/// Consumer wrapper owning a broker client
pub struct MessageConsumer {
    provider: Arc<dyn BrokerConsumerProvider>,
    tracker: TaskTracker,
    stop: CancellationToken,
    closed: AtomicBool,
}

impl MessageConsumer {
    pub fn new(provider: Arc<dyn BrokerConsumerProvider>) -> Self {
        Self {
            provider,
            tracker: TaskTracker::new(),
            stop: CancellationToken::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Subscribe to `topics` and deliver records to `handler` in the background
    ///
    /// Returns once every partition stream is open. Fails with
    /// `Subscription` (and starts nothing) if any topic or partition cannot
    /// be opened. Delivery stops when `cancel` fires or the consumer closes;
    /// a handler call in progress is allowed to finish.
    pub async fn consume<S: AsRef<str>>(
        &self,
        cancel: &CancellationToken,
        topics: &[S],
        handler: Arc<dyn RecordHandler>,
    ) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::subscription("consumer is closed"));
        }
        if topics.is_empty() {
            return Err(Error::subscription("no topics requested"));
        }

        let mut streams: Vec<PartitionStream> = Vec::new();
        for topic in topics {
            let topic = topic.as_ref();
            let partitions = self
                .provider
                .partitions(topic)
                .await
                .map_err(|e| subscription_error(topic, e))?;
            for partition in partitions {
                let stream = self
                    .provider
                    .open_partition(topic, partition)
                    .await
                    .map_err(|e| subscription_error(topic, e))?;
                streams.push(stream);
            }
        }

        let partition_count = streams.len();
        let topics: Vec<String> = topics.iter().map(|t| t.as_ref().to_string()).collect();
        info!(?topics, partitions = partition_count, "Subscribed");

        self.tracker.spawn(deliver(
            streams,
            handler,
            cancel.clone(),
            self.stop.clone(),
        ));
        Ok(())
    }

    /// Delivery tasks still running
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Stop delivery, wait for it to finish, then release the broker client
    ///
    /// Release failures are returned as `Close`. Later calls are no-ops.
    pub async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.stop.cancel();
        self.tracker.close();
        self.tracker.wait().await;
        debug!("Delivery tasks stopped");

        self.provider.close().await.map_err(|e| match e {
            Error::Close { .. } => e,
            other => Error::close_with_source("Failed to release broker consumer", other),
        })?;
        info!(provider = self.provider.provider_name(), "Consumer closed");
        Ok(())
    }
}

fn subscription_error(topic: &str, error: Error) -> Error {
    match error {
        Error::Subscription { .. } => error,
        other => Error::subscription_with_source(format!("Cannot subscribe to '{topic}'"), other),
    }
}

/// Background delivery loop over the merged partition streams
async fn deliver(
    streams: Vec<PartitionStream>,
    handler: Arc<dyn RecordHandler>,
    cancel: CancellationToken,
    stop: CancellationToken,
) {
    let mut merged = select_all(streams);

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = stop.cancelled() => break,
            next = merged.next() => next,
        };

        match next {
            Some(Ok(record)) => {
                debug!(
                    topic = %record.topic,
                    partition = record.partition,
                    offset = record.offset,
                    "Record received"
                );
                handler.handle(&record).await;
            }
            Some(Err(e)) => {
                error!(error = %e, "Partition read failed");
                handler.on_error(&e).await;
            }
            None => {
                info!("All partition streams ended");
                break;
            }
        }
    }

    debug!("Delivery task exiting");
}

impl std::fmt::Debug for MessageConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageConsumer")
            .field("provider", &self.provider.provider_name())
            .field("active_tasks", &self.tracker.len())
            .finish_non_exhaustive()
    }
}
