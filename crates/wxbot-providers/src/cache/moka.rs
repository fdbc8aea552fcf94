//! Moka in-memory cache provider
//!
//! Concurrent in-process cache. Each entry carries the TTL it was written
//! with, and an overwrite restarts that TTL.
//!
//! ## Example
//!
//! ```ignore
//! use wxbot_providers::cache::MokaCacheProvider;
//!
//! let provider = MokaCacheProvider::with_capacity(1000);
//! provider.set_json("weather:Москва", json, CacheEntryConfig::default()).await?;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use wxbot_domain::error::Result;
use wxbot_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};

use super::ensure_open;
use crate::constants::CACHE_DEFAULT_MAX_CAPACITY;

/// Cached JSON plus the TTL it was written with
#[derive(Clone)]
struct StoredValue {
    json: Arc<str>,
    ttl: Duration,
}

/// Expires each entry `ttl` after its latest write
struct WriteTtl;

impl Expiry<String, StoredValue> for WriteTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Moka-based in-memory cache provider
pub struct MokaCacheProvider {
    cache: Cache<String, StoredValue>,
    max_capacity: u64,
    closed: AtomicBool,
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MokaCacheProvider {
    /// Create a new Moka cache provider with default settings
    pub fn new() -> Self {
        Self::with_capacity(CACHE_DEFAULT_MAX_CAPACITY)
    }

    /// Create a new Moka cache provider holding at most `max_capacity` entries
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(WriteTtl)
            .build();

        Self {
            cache,
            max_capacity,
            closed: AtomicBool::new(false),
        }
    }

    /// Get the maximum capacity of the cache
    pub fn max_capacity(&self) -> u64 {
        self.max_capacity
    }

    fn check(&self) -> Result<()> {
        ensure_open(self.closed.load(Ordering::Acquire), "moka")
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(self.cache.get(key).await.map(|value| value.json.to_string()))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        self.check()?;
        let stored = StoredValue {
            json: Arc::from(value),
            ttl: config.effective_ttl(),
        };
        self.cache.insert(key.to_string(), stored).await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.cache.invalidate_all();
            self.cache.run_pending_tasks().await;
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_capacity", &self.max_capacity)
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

use wxbot_application::ports::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "moka",
    description: "Moka in-process cache with per-entry TTL",
    factory: |config: &CacheProviderConfig| {
        let provider = match config.max_capacity {
            Some(max_capacity) => MokaCacheProvider::with_capacity(max_capacity),
            None => MokaCacheProvider::new(),
        };
        Ok(Arc::new(provider))
    },
};
