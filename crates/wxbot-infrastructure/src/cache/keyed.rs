//! Namespaced, TTL-bounded weather cache
//!
//! Entries are stored as JSON under `<namespace>:<entity>` with the TTL
//! reset on every write. The store owns expiry; this wrapper owns only the
//! provider handle.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use wxbot_domain::constants::{CACHE_KEY_SEPARATOR, WEATHER_CACHE_NAMESPACE};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::CacheEntry;

use crate::error_ext::ErrorContext;

/// Store key of `key` within `namespace`
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}{CACHE_KEY_SEPARATOR}{key}")
}

/// Weather cache over a shared `CacheProvider`
///
/// Safe for concurrent use by the refresh loop and readers. After
/// [`close`](WeatherCacheRepository::close) every call fails with `Store`.
pub struct KeyedCache {
    provider: Arc<dyn CacheProvider>,
    namespace: String,
    ttl: Duration,
    closed: AtomicBool,
}

impl KeyedCache {
    pub fn new(provider: Arc<dyn CacheProvider>, namespace: impl Into<String>, ttl: Duration) -> Self {
        Self {
            provider,
            namespace: namespace.into(),
            ttl,
            closed: AtomicBool::new(false),
        }
    }

    /// Cache under the default `weather` namespace
    pub fn weather(provider: Arc<dyn CacheProvider>, ttl: Duration) -> Self {
        Self::new(provider, WEATHER_CACHE_NAMESPACE, ttl)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// TTL applied on every write
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    fn key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(Error::store(format!("{} cache is closed", self.namespace)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WeatherCacheRepository for KeyedCache {
    async fn get(&self, key: &str) -> Result<CacheEntry> {
        self.ensure_open()?;
        let store_key = self.key(key);

        let json = self
            .provider
            .get_json(&store_key)
            .await?
            .ok_or_else(|| Error::not_found(format!("cache entry '{store_key}'")))?;

        serde_json::from_str(&json).store_context(format!("Corrupt cache entry '{store_key}'"))
    }

    async fn put(&self, key: &str, mut entry: CacheEntry) -> Result<()> {
        self.ensure_open()?;
        let store_key = self.key(key);

        entry.entity_key = key.to_string();
        entry.updated_at = Utc::now();
        let json = serde_json::to_string(&entry)
            .store_context(format!("Failed to encode cache entry '{store_key}'"))?;

        self.provider
            .set_json(&store_key, &json, CacheEntryConfig::new().with_ttl(self.ttl))
            .await?;
        debug!(key = %store_key, ttl = ?self.ttl, "Cache entry written");
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.provider.close().await?;
        info!(
            namespace = %self.namespace,
            provider = self.provider.provider_name(),
            "Cache closed"
        );
        Ok(())
    }
}

impl std::fmt::Debug for KeyedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCache")
            .field("provider", &self.provider.provider_name())
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
