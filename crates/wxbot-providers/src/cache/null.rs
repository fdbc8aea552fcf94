//! Null cache provider for testing
//!
//! Accepts every write and stores nothing.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use wxbot_domain::error::Result;
use wxbot_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};

use super::ensure_open;

/// Null cache provider that doesn't store anything
///
/// # Example
///
/// ```rust
/// use wxbot_providers::cache::NullCacheProvider;
///
/// let provider = NullCacheProvider::new();
/// // All operations succeed but nothing is cached
/// ```
#[derive(Debug, Default)]
pub struct NullCacheProvider {
    closed: AtomicBool,
}

impl NullCacheProvider {
    /// Create a new null cache provider
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&self) -> Result<()> {
        ensure_open(self.closed.load(Ordering::Acquire), "null")
    }
}

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        self.check()?;
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        self.check()
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

// ============================================================================
// Auto-registration via linkme
// ============================================================================

use wxbot_application::ports::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static NULL_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "null",
    description: "No-op cache provider (stores nothing)",
    factory: |_config: &CacheProviderConfig| Ok(std::sync::Arc::new(NullCacheProvider::new())),
};
