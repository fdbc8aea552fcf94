//! Composition root tests

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use wxbot_application::use_cases::{LookupSource, SweepReport};
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::{CacheEntry, ConversationId, Coordinates, Error, Snapshot};
use wxbot_infrastructure::config::{AppConfig, BrokerBackend};
use wxbot_infrastructure::init_app;

/// Config that starts no network clients
fn offline_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.scheduler.enabled = false;
    config.shutdown_timeout_secs = 2;
    config
}

#[tokio::test]
async fn test_published_reports_reach_the_listener() {
    let context = init_app(offline_config()).await.unwrap();
    context.start().await.unwrap();

    let report = SweepReport {
        started_at: Utc::now(),
        refreshed: vec!["Москва".to_string()],
        failures: Vec::new(),
    };
    let producer = context.producer().unwrap();
    producer
        .produce(
            &CancellationToken::new(),
            serde_json::to_vec(&report).unwrap(),
            "weather-updates",
        )
        .await
        .unwrap();

    let mut received = false;
    for _ in 0..100 {
        if context.reports_received() == 1 {
            received = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(received);

    context.shutdown().await.unwrap();
    assert_eq!(context.consumer().unwrap().active_tasks(), 0);
    assert!(context.cache().get("Москва").await.is_err());
}

#[tokio::test]
async fn test_lookup_is_served_from_cache() {
    let context = init_app(offline_config()).await.unwrap();
    let snapshot = Snapshot::new("пасмурно", 4.0, 81, 5.0);
    context
        .cache()
        .put(
            "Коломна",
            CacheEntry::new("Коломна", Coordinates::new(55.1, 38.8), snapshot.clone()),
        )
        .await
        .unwrap();

    let report = context
        .lookup()
        .current_weather(ConversationId(7), "Коломна")
        .await
        .unwrap();

    assert_eq!(report.source, LookupSource::Cache);
    assert_eq!(report.snapshot, snapshot);
    assert_eq!(
        context.lookup().selected_location(ConversationId(7)).unwrap().name,
        "Коломна"
    );
    context.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disabled_broker_starts_nothing() {
    let mut config = offline_config();
    config.broker.provider = BrokerBackend::Disabled;

    let context = init_app(config).await.unwrap();
    context.start().await.unwrap();

    assert!(context.producer().is_none());
    assert!(context.consumer().is_none());
    context.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_unknown_cache_provider_is_configuration_error() {
    let mut config = offline_config();
    config.cache.provider = "memcached".to_string();

    let err = init_app(config).await.unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.to_string().contains("memcached"));
}

#[tokio::test]
async fn test_scheduler_is_wired_when_enabled() {
    let mut config = offline_config();
    config.scheduler.enabled = true;
    config.scheduler.period_secs = Some(300);

    let context = init_app(config).await.unwrap();
    let scheduler = context.scheduler().unwrap();

    assert_eq!(scheduler.period(), Duration::from_secs(300));
    assert_eq!(scheduler.roster().len(), 4);
    context.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_stuck_refresh_keeps_cache_open() {
    // Accepts connections but never answers, so the first sweep hangs
    let silent = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = offline_config();
    config.scheduler.enabled = true;
    config.weather.geo_url = format!("http://{}/geo/1.0/direct", silent.local_addr().unwrap());
    config.weather.timeout_secs = 60;
    config.shutdown_timeout_secs = 1;

    let context = init_app(config).await.unwrap();
    context.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let err = context.shutdown().await.unwrap_err();

    assert!(err.is_timeout());
    assert!(context.cache().get("Москва").await.unwrap_err().is_not_found());
}
