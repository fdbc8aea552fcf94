//! Sweep reports over the broker
//!
//! [`SweepNotifier`] publishes every [`SweepReport`] as JSON;
//! [`SweepReportListener`] is the matching record handler that logs them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wxbot_application::use_cases::{SweepObserver, SweepReport};
use wxbot_domain::InboundRecord;
use wxbot_domain::ports::providers::broker::RecordHandler;

use super::MessageProducer;

/// Publishes sweep reports to one topic
pub struct SweepNotifier {
    producer: Arc<MessageProducer>,
    topic: String,
    cancel: CancellationToken,
}

impl SweepNotifier {
    pub fn new(
        producer: Arc<MessageProducer>,
        topic: impl Into<String>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            producer,
            topic: topic.into(),
            cancel,
        }
    }
}

#[async_trait]
impl SweepObserver for SweepNotifier {
    async fn on_sweep(&self, report: &SweepReport) {
        let payload = match serde_json::to_vec(report) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to encode sweep report");
                return;
            }
        };

        match self.producer.produce(&self.cancel, payload, &self.topic).await {
            Ok(metadata) => debug!(
                topic = %self.topic,
                partition = metadata.partition,
                offset = metadata.offset,
                "Sweep report published"
            ),
            Err(e) if e.is_cancelled() => debug!("Sweep report dropped during shutdown"),
            Err(e) => warn!(topic = %self.topic, error = %e, "Failed to publish sweep report"),
        }
    }
}

/// Logs sweep reports received from the broker
#[derive(Debug, Default)]
pub struct SweepReportListener {
    received: AtomicU64,
}

impl SweepReportListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports decoded so far
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RecordHandler for SweepReportListener {
    async fn handle(&self, record: &InboundRecord) {
        match serde_json::from_slice::<SweepReport>(&record.payload) {
            Ok(report) => {
                self.received.fetch_add(1, Ordering::Relaxed);
                info!(
                    partition = record.partition,
                    offset = record.offset,
                    refreshed = report.refreshed.len(),
                    failed = report.failures.len(),
                    started_at = %report.started_at,
                    "Sweep report received"
                );
            }
            Err(e) => warn!(
                topic = %record.topic,
                offset = record.offset,
                error = %e,
                "Ignoring record that is not a sweep report"
            ),
        }
    }
}
