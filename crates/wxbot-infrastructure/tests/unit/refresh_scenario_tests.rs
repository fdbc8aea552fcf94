//! Refresh scheduler writing through the keyed cache

use std::sync::Arc;
use std::time::Duration;

use wxbot_application::use_cases::{RefreshScheduler, RefreshStage};
use wxbot_domain::ports::providers::cache::CacheProvider;
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::{Roster, Snapshot};
use wxbot_infrastructure::cache::KeyedCache;
use wxbot_providers::cache::MokaCacheProvider;

use crate::support::CannedWeather;

#[tokio::test]
async fn test_failing_entity_does_not_block_the_others() {
    let clear = Snapshot::new("clear", 20.0, 40, 3.0);
    let provider = Arc::new(CannedWeather::default().with_place("CityA", clear.clone()));
    let cache = Arc::new(KeyedCache::weather(
        Arc::new(MokaCacheProvider::new()) as Arc<dyn CacheProvider>,
        Duration::from_secs(600),
    ));
    let scheduler = RefreshScheduler::new(
        Roster::new(["CityA", "CityB"]).unwrap(),
        Duration::from_secs(600),
        provider,
        Arc::clone(&cache) as _,
    )
    .unwrap();

    let report = scheduler.sweep().await;

    assert_eq!(report.refreshed, vec!["CityA".to_string()]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].entity, "CityB");
    assert_eq!(report.failures[0].stage, RefreshStage::Resolve);

    let cached = cache.get("CityA").await.unwrap();
    assert_eq!(cached.snapshot, clear);
    assert!(cached.updated_at >= report.started_at);
    assert!(cache.get("CityB").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_entry() {
    let provider = Arc::new(
        CannedWeather::default().with_place("CityA", Snapshot::new("rain", 12.0, 90, 6.0)),
    );
    let cache = Arc::new(KeyedCache::weather(
        Arc::new(MokaCacheProvider::new()) as Arc<dyn CacheProvider>,
        Duration::from_secs(600),
    ));
    let first = RefreshScheduler::new(
        Roster::new(["CityA"]).unwrap(),
        Duration::from_secs(600),
        provider,
        Arc::clone(&cache) as _,
    )
    .unwrap();
    first.sweep().await;
    let written = cache.get("CityA").await.unwrap();

    let broken = RefreshScheduler::new(
        Roster::new(["CityA"]).unwrap(),
        Duration::from_secs(600),
        Arc::new(CannedWeather::default()),
        Arc::clone(&cache) as _,
    )
    .unwrap();
    let report = broken.sweep().await;

    assert!(!report.is_complete());
    assert_eq!(cache.get("CityA").await.unwrap(), written);
}
