//! Cache Refresh Use Case
//!
//! Keeps the cache entry for every roster entity fresh. One tick sweeps
//! the whole roster in order: resolve coordinates, fetch a snapshot, write
//! the entry. A failure for one entity is logged and recorded, and the
//! sweep moves on to the next.
//!
//! The tick period normally equals the cache TTL, so a successful refresh
//! lands before the previous entry expires. An entity that keeps failing
//! simply expires from the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::{CacheEntry, Roster};

/// Step of an entity refresh that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStage {
    /// Coordinates could not be resolved
    Resolve,
    /// Snapshot could not be fetched
    Fetch,
    /// Entry could not be written
    Store,
}

/// One skipped entity in a sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshFailure {
    pub entity: String,
    pub stage: RefreshStage,
    pub error: String,
}

impl RefreshFailure {
    fn new(entity: &str, stage: RefreshStage, error: &Error) -> Self {
        Self {
            entity: entity.to_string(),
            stage,
            error: error.to_string(),
        }
    }
}

/// Outcome of one roster sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Time the sweep started; every entry written by it is stamped later
    pub started_at: DateTime<Utc>,
    /// Entities written, in roster order
    pub refreshed: Vec<String>,
    /// Entities skipped, in roster order
    pub failures: Vec<RefreshFailure>,
}

impl SweepReport {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            refreshed: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// True when every roster entity was refreshed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Cumulative refresh counters
#[derive(Debug, Default)]
pub struct RefreshStats {
    ticks: AtomicU64,
    refreshed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`RefreshStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStatsSnapshot {
    pub ticks: u64,
    pub refreshed: u64,
    pub failed: u64,
}

impl RefreshStats {
    fn record(&self, report: &SweepReport) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.refreshed
            .fetch_add(report.refreshed.len() as u64, Ordering::Relaxed);
        self.failed
            .fetch_add(report.failures.len() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RefreshStatsSnapshot {
        RefreshStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            refreshed: self.refreshed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Notified after every completed sweep
#[async_trait]
pub trait SweepObserver: Send + Sync {
    async fn on_sweep(&self, report: &SweepReport);
}

/// Periodic roster refresher
///
/// `Idle` until [`run`](Self::run) is awaited, then ticks until the
/// cancellation token fires. Cancellation is observed between sweeps only;
/// a sweep in progress always finishes.
pub struct RefreshScheduler {
    roster: Roster,
    period: Duration,
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn WeatherCacheRepository>,
    stats: Arc<RefreshStats>,
    observer: Option<Arc<dyn SweepObserver>>,
}

impl RefreshScheduler {
    /// Create a scheduler; `period` must be non-zero
    pub fn new(
        roster: Roster,
        period: Duration,
        provider: Arc<dyn WeatherProvider>,
        cache: Arc<dyn WeatherCacheRepository>,
    ) -> Result<Self> {
        if period.is_zero() {
            return Err(Error::invalid_argument(
                "Refresh period must be greater than zero",
            ));
        }
        Ok(Self {
            roster,
            period,
            provider,
            cache,
            stats: Arc::new(RefreshStats::default()),
            observer: None,
        })
    }

    /// Attach a sweep observer
    pub fn with_observer(mut self, observer: Arc<dyn SweepObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> RefreshStatsSnapshot {
        self.stats.snapshot()
    }

    /// Tick until `cancel` fires
    ///
    /// The first sweep starts immediately. A sweep that overruns the period
    /// delays the next tick instead of bursting to catch up.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            entities = self.roster.len(),
            period = ?self.period,
            provider = self.provider.provider_name(),
            "Refresh scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let report = self.sweep().await;
            if let Some(observer) = &self.observer {
                observer.on_sweep(&report).await;
            }
        }

        info!("Refresh scheduler stopped");
    }

    /// Refresh every roster entity once, in roster order
    pub async fn sweep(&self) -> SweepReport {
        let mut report = SweepReport::new(Utc::now());

        for entity in self.roster.iter() {
            match self.refresh_entity(entity).await {
                Ok(()) => {
                    debug!(entity, "Cache entry refreshed");
                    report.refreshed.push(entity.to_string());
                }
                Err(failure) => {
                    warn!(
                        entity,
                        stage = ?failure.stage,
                        error = %failure.error,
                        "Skipping entity for this tick"
                    );
                    report.failures.push(failure);
                }
            }
        }

        self.stats.record(&report);
        info!(
            refreshed = report.refreshed.len(),
            failed = report.failures.len(),
            "Roster sweep finished"
        );
        report
    }

    async fn refresh_entity(&self, entity: &str) -> std::result::Result<(), RefreshFailure> {
        let coordinates = self
            .provider
            .resolve_coordinates(entity)
            .await
            .map_err(|e| RefreshFailure::new(entity, RefreshStage::Resolve, &e))?;

        let snapshot = self
            .provider
            .fetch_snapshot(coordinates)
            .await
            .map_err(|e| RefreshFailure::new(entity, RefreshStage::Fetch, &e))?;

        self.cache
            .put(entity, CacheEntry::new(entity, coordinates, snapshot))
            .await
            .map_err(|e| RefreshFailure::new(entity, RefreshStage::Store, &e))
    }
}
