//! Cache Provider Port
//!
//! Port for TTL-bounded key/value stores. Supports multiple backends
//! including in-memory (Moka), distributed (Redis), and null providers
//! for wiring tests.

use crate::constants::DEFAULT_CACHE_TTL_SECS;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache Entry Configuration
///
/// Configures how a cache entry should be stored.
///
/// # Example
///
/// ```
/// use wxbot_domain::ports::providers::cache::CacheEntryConfig;
/// use std::time::Duration;
///
/// let config = CacheEntryConfig::default().with_ttl(Duration::from_secs(600));
/// assert_eq!(config.effective_ttl(), Duration::from_secs(600));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live for the cache entry, measured from this write
    pub ttl: Option<Duration>,
}

impl CacheEntryConfig {
    /// Create a new cache entry config with default TTL
    pub fn new() -> Self {
        Self {
            ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
        }
    }

    /// Set the TTL for the cache entry
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Get the effective TTL, falling back to default
    pub fn effective_ttl(&self) -> Duration {
        self.ttl
            .unwrap_or(Duration::from_secs(DEFAULT_CACHE_TTL_SECS))
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache Provider Port
///
/// Defines the contract for cache backend providers. Implementations
/// store JSON strings and expire them a TTL after the last write; expiry
/// is the store's job, not the caller's.
///
/// Every implementation must be safe for concurrent use. After
/// [`close`](CacheProvider::close) every other operation fails with
/// [`Error::Store`](crate::error::Error::Store).
///
/// # Implementations
///
/// - **Moka**: In-memory cache with per-entry TTL
/// - **Redis**: Distributed cache with `SET EX`
/// - **Null**: No-op provider for testing
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    /// Get a value from the cache as JSON string
    ///
    /// `None` when the key is absent or expired.
    async fn get_json(&self, key: &str) -> Result<Option<String>>;

    /// Set a value in the cache from JSON string, resetting its TTL
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;

    /// Release the underlying connection
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}
