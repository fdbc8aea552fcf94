//! Weather Cache Repository Interface

use crate::entities::CacheEntry;
use crate::error::Result;
use async_trait::async_trait;

/// Repository: cached weather entries keyed by entity
///
/// Writers own `updated_at`: [`put`](Self::put) stamps the write time and
/// resets the entry's TTL. Expiry happens in the store.
///
/// # Example
///
/// ```ignore
/// use wxbot_domain::repositories::WeatherCacheRepository;
///
/// repo.put("Москва", entry).await?;
/// let cached = repo.get("Москва").await?;
/// assert!(cached.updated_at >= tick_start);
/// ```
#[async_trait]
pub trait WeatherCacheRepository: Send + Sync {
    /// Read the entry for `key`
    ///
    /// Fails with `NotFound` when absent or expired, `Store` on transport,
    /// decoding or closed-store failures.
    async fn get(&self, key: &str) -> Result<CacheEntry>;

    /// Overwrite the entry for `key` in a single write
    async fn put(&self, key: &str, entry: CacheEntry) -> Result<()>;

    /// Release the store connection; later calls fail with `Store`
    async fn close(&self) -> Result<()>;
}
