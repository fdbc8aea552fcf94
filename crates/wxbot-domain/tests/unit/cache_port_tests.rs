//! Unit tests for cache port value types

use std::time::Duration;
use wxbot_domain::constants::DEFAULT_CACHE_TTL_SECS;
use wxbot_domain::ports::providers::cache::CacheEntryConfig;

#[test]
fn test_entry_config_defaults_to_domain_ttl() {
    let config = CacheEntryConfig::default();
    assert_eq!(
        config.effective_ttl(),
        Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
    );
}

#[test]
fn test_entry_config_without_ttl_falls_back() {
    let config = CacheEntryConfig { ttl: None };
    assert_eq!(
        config.effective_ttl(),
        Duration::from_secs(DEFAULT_CACHE_TTL_SECS)
    );
    assert_eq!(
        config.with_ttl(Duration::from_secs(5)).effective_ttl(),
        Duration::from_secs(5)
    );
}
