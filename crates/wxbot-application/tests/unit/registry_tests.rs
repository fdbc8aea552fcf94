//! Tests for the cache provider registry
//!
//! `extern crate wxbot_providers` forces linkme registration of the real
//! providers.

extern crate wxbot_providers;

use wxbot_application::ports::registry::cache::*;

#[test]
fn test_list_providers_includes_null_provider() {
    let providers = list_cache_providers();
    assert!(
        providers.iter().any(|(name, _)| *name == "null"),
        "Null provider should be registered. Available: {providers:?}"
    );
}

#[test]
fn test_resolve_null_cache_provider() {
    let provider = resolve_cache_provider(&CacheProviderConfig::new("null")).unwrap();
    assert_eq!(provider.provider_name(), "null");
}

#[test]
fn test_resolve_moka_cache_provider() {
    let config = CacheProviderConfig::new("moka").with_max_capacity(100);
    let provider = resolve_cache_provider(&config).unwrap();
    assert_eq!(provider.provider_name(), "moka");
}

#[test]
fn test_resolve_unknown_provider_lists_available() {
    let err = resolve_cache_provider(&CacheProviderConfig::new("memcached")).unwrap_err();
    assert!(err.contains("memcached"));
    assert!(err.contains("null"));
}
