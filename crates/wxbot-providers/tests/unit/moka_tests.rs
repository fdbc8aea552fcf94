//! Tests for the Moka cache provider

use std::time::Duration;

use wxbot_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};
use wxbot_providers::cache::MokaCacheProvider;

fn short_ttl(ms: u64) -> CacheEntryConfig {
    CacheEntryConfig::default().with_ttl(Duration::from_millis(ms))
}

#[tokio::test]
async fn test_moka_set_and_get() {
    let provider = MokaCacheProvider::with_capacity(100);
    provider
        .set_json("weather:Москва", r#"{"t":1}"#, CacheEntryConfig::default())
        .await
        .unwrap();

    let value = provider.get_json("weather:Москва").await.unwrap();
    assert_eq!(value.as_deref(), Some(r#"{"t":1}"#));
}

#[tokio::test]
async fn test_moka_miss_returns_none() {
    let provider = MokaCacheProvider::new();
    assert!(provider.get_json("weather:missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_moka_entry_expires_after_its_ttl() {
    let provider = MokaCacheProvider::new();
    provider
        .set_json("weather:Орск", "{}", short_ttl(100))
        .await
        .unwrap();
    provider
        .set_json("weather:Москва", "{}", CacheEntryConfig::default())
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(provider.get_json("weather:Орск").await.unwrap().is_none());
    assert!(provider.get_json("weather:Москва").await.unwrap().is_some());
}

#[tokio::test]
async fn test_moka_overwrite_restarts_ttl() {
    let provider = MokaCacheProvider::new();
    provider
        .set_json("weather:Коломна", "1", short_ttl(400))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;
    provider
        .set_json("weather:Коломна", "2", short_ttl(400))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(250)).await;

    let value = provider.get_json("weather:Коломна").await.unwrap();
    assert_eq!(value.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_moka_operations_fail_after_close() {
    let provider = MokaCacheProvider::new();
    provider
        .set_json("k", "v", CacheEntryConfig::default())
        .await
        .unwrap();
    provider.close().await.unwrap();

    let err = provider.get_json("k").await.unwrap_err();
    assert!(err.to_string().contains("closed"));
    assert!(
        provider
            .set_json("k", "v", CacheEntryConfig::default())
            .await
            .is_err()
    );
}

#[test]
fn test_moka_provider_name() {
    assert_eq!(MokaCacheProvider::new().provider_name(), "moka");
}
