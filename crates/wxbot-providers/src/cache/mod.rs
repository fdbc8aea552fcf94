//! Cache Provider Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`NullCacheProvider`] | Testing | No-op stub for wiring tests |
//! | [`MokaCacheProvider`] | Local | In-process cache with per-entry TTL |
//! | [`RedisCacheProvider`] | Distributed | Redis `SET EX` store shared across instances |
//!
//! ## Provider Selection Guide
//!
//! - **Development/Testing**: `NullCacheProvider` or `MokaCacheProvider`
//! - **Single Instance**: `MokaCacheProvider`
//! - **Multi Instance**: `RedisCacheProvider`

#[cfg(feature = "cache-moka")]
pub mod moka;
pub mod null;
#[cfg(feature = "cache-redis")]
pub mod redis;

#[cfg(feature = "cache-moka")]
pub use moka::MokaCacheProvider;
pub use null::NullCacheProvider;
#[cfg(feature = "cache-redis")]
pub use redis::RedisCacheProvider;

pub use wxbot_domain::ports::providers::cache::CacheEntryConfig;

use wxbot_domain::error::{Error, Result};

/// Fail with `Store` once a provider has been closed
pub(crate) fn ensure_open(closed: bool, provider: &str) -> Result<()> {
    if closed {
        Err(Error::store(format!("{provider} cache is closed")))
    } else {
        Ok(())
    }
}
