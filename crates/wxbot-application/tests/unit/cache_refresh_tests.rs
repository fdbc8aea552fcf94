//! Tests for the refresh scheduler

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use wxbot_application::use_cases::{RefreshScheduler, RefreshStage, SweepObserver, SweepReport};
use wxbot_domain::error::Result;
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::{Coordinates, Roster, Snapshot};

use crate::support::{FakeWeather, MemoryCache, clear};

fn scheduler(
    keys: &[&str],
    provider: FakeWeather,
    cache: Arc<MemoryCache>,
) -> RefreshScheduler {
    RefreshScheduler::new(
        Roster::new(keys.iter().copied()).unwrap(),
        Duration::from_secs(600),
        Arc::new(provider),
        cache,
    )
    .unwrap()
}

#[derive(Default)]
struct CountingObserver {
    sweeps: AtomicUsize,
}

#[async_trait]
impl SweepObserver for CountingObserver {
    async fn on_sweep(&self, _report: &SweepReport) {
        self.sweeps.fetch_add(1, Ordering::SeqCst);
    }
}

/// Holds resolution of one place until released
struct GatedWeather {
    inner: FakeWeather,
    gated: &'static str,
    entered: Notify,
    release: Notify,
}

impl GatedWeather {
    fn new(gated: &'static str, inner: FakeWeather) -> Self {
        Self {
            inner,
            gated,
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for GatedWeather {
    async fn resolve_coordinates(&self, name: &str) -> Result<Coordinates> {
        if name == self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.resolve_coordinates(name).await
    }

    async fn fetch_snapshot(&self, coordinates: Coordinates) -> Result<Snapshot> {
        self.inner.fetch_snapshot(coordinates).await
    }

    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Snapshot>> {
        self.inner.fetch_forecast(coordinates).await
    }

    fn provider_name(&self) -> &str {
        "gated"
    }
}

#[tokio::test]
async fn test_sweep_refreshes_every_entity() {
    let cache = Arc::new(MemoryCache::new());
    let provider = FakeWeather::new()
        .with_place("CityA", 10.0, clear())
        .with_place("CityB", 20.0, clear());
    let scheduler = scheduler(&["CityA", "CityB"], provider, Arc::clone(&cache));

    let report = scheduler.sweep().await;

    assert!(report.is_complete());
    assert_eq!(report.refreshed, vec!["CityA", "CityB"]);
    for key in ["CityA", "CityB"] {
        let entry = cache.get(key).await.unwrap();
        assert!(entry.updated_at >= report.started_at);
    }
}

#[tokio::test]
async fn test_one_failing_entity_does_not_abort_sweep() {
    let cache = Arc::new(MemoryCache::new());
    let provider = FakeWeather::new()
        .with_place("CityA", 10.0, clear())
        .with_failing_fetch("CityB", 20.0);
    let scheduler = scheduler(&["CityA", "CityB"], provider, Arc::clone(&cache));

    let report = scheduler.sweep().await;

    assert_eq!(report.refreshed, vec!["CityA"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entity, "CityB");
    assert_eq!(report.failures[0].stage, RefreshStage::Fetch);

    let entry = cache.get("CityA").await.unwrap();
    assert_eq!(entry.snapshot, clear());
    assert!(cache.get("CityB").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_unresolvable_and_unwritable_entities_are_skipped() {
    let cache = Arc::new(MemoryCache {
        fail_writes_for: Some("CityC".to_string()),
        ..MemoryCache::new()
    });
    let provider = FakeWeather::new()
        .with_place("CityA", 10.0, clear())
        .with_place("CityC", 30.0, clear());
    let scheduler = scheduler(&["Nowhere", "CityA", "CityC"], provider, Arc::clone(&cache));

    let report = scheduler.sweep().await;

    assert_eq!(report.refreshed, vec!["CityA"]);
    let stages: Vec<_> = report.failures.iter().map(|f| f.stage).collect();
    assert_eq!(stages, vec![RefreshStage::Resolve, RefreshStage::Store]);
    assert_eq!(cache.len(), 1);

    let stats = scheduler.stats();
    assert_eq!(stats.ticks, 1);
    assert_eq!(stats.refreshed, 1);
    assert_eq!(stats.failed, 2);
}

#[test]
fn test_zero_period_is_rejected() {
    let result = RefreshScheduler::new(
        Roster::new(["CityA"]).unwrap(),
        Duration::ZERO,
        Arc::new(FakeWeather::new()),
        Arc::new(MemoryCache::new()),
    );
    assert!(result.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_run_ticks_once_per_period_until_cancelled() {
    let cache = Arc::new(MemoryCache::new());
    let observer = Arc::new(CountingObserver::default());
    let scheduler = Arc::new(
        scheduler(
            &["CityA"],
            FakeWeather::new().with_place("CityA", 10.0, clear()),
            cache,
        )
        .with_observer(observer.clone()),
    );

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    // First tick fires immediately, then one per period
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(observer.sweeps.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(1200)).await;
    assert_eq!(observer.sweeps.load(Ordering::SeqCst), 3);

    cancel.cancel();
    handle.await.unwrap();
    assert_eq!(scheduler.stats().ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_run_with_cancelled_token_never_sweeps() {
    let cache = Arc::new(MemoryCache::new());
    let scheduler = scheduler(
        &["CityA"],
        FakeWeather::new().with_place("CityA", 10.0, clear()),
        Arc::clone(&cache),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    scheduler.run(cancel).await;

    assert_eq!(scheduler.stats().ticks, 0);
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_sweep_lets_the_sweep_finish() {
    let cache = Arc::new(MemoryCache::new());
    let provider = Arc::new(GatedWeather::new(
        "CityA",
        FakeWeather::new()
            .with_place("CityA", 10.0, clear())
            .with_place("CityB", 20.0, clear()),
    ));
    let scheduler = Arc::new(
        RefreshScheduler::new(
            Roster::new(["CityA", "CityB"]).unwrap(),
            Duration::from_secs(600),
            Arc::clone(&provider) as Arc<dyn WeatherProvider>,
            Arc::clone(&cache) as Arc<dyn WeatherCacheRepository>,
        )
        .unwrap(),
    );
    let cancel = CancellationToken::new();
    let run = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        let cancel = cancel.clone();
        async move { scheduler.run(cancel).await }
    });

    provider.entered.notified().await;
    cancel.cancel();
    tokio::task::yield_now().await;
    assert!(!run.is_finished());

    provider.release.notify_one();
    run.await.unwrap();

    assert_eq!(cache.len(), 2);
    assert!(cache.get("CityA").await.is_ok());
    assert!(cache.get("CityB").await.is_ok());
    assert_eq!(scheduler.stats().ticks, 1);
}
