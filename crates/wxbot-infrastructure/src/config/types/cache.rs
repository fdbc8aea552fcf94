//! Cache configuration types

use serde::{Deserialize, Serialize};
use wxbot_application::ports::registry::CacheProviderConfig;
use wxbot_domain::constants::{DEFAULT_CACHE_TTL_SECS, WEATHER_CACHE_NAMESPACE};

use wxbot_providers::constants::CACHE_DEFAULT_MAX_CAPACITY;

use crate::constants::DEFAULT_CACHE_PROVIDER;

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Registered provider name (`moka`, `redis`, `null`)
    pub provider: String,

    /// Redis URL (for the Redis provider)
    pub redis_url: Option<String>,

    /// Key namespace of cached weather entries
    pub namespace: String,

    /// Entry TTL in seconds, measured from the last write
    pub ttl_secs: u64,

    /// Maximum number of entries (in-process providers)
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: DEFAULT_CACHE_PROVIDER.to_string(),
            redis_url: None,
            namespace: WEATHER_CACHE_NAMESPACE.to_string(),
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_capacity: CACHE_DEFAULT_MAX_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Registry config used to resolve the provider
    pub fn to_provider_config(&self) -> CacheProviderConfig {
        let config =
            CacheProviderConfig::new(&self.provider).with_max_capacity(self.max_capacity);
        match &self.redis_url {
            Some(url) => config.with_uri(url),
            None => config,
        }
    }
}
