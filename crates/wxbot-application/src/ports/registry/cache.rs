//! Cache Provider Registry

use std::sync::Arc;

use wxbot_domain::ports::providers::cache::CacheProvider;

/// Configuration for cache provider creation
///
/// Providers use what they need and ignore the rest.
#[derive(Debug, Clone, Default)]
pub struct CacheProviderConfig {
    /// Provider name (e.g., "moka", "redis", "null")
    pub provider: String,
    /// Connection URI (for distributed caches)
    pub uri: Option<String>,
    /// Maximum number of entries (for in-process caches)
    pub max_capacity: Option<u64>,
}

impl CacheProviderConfig {
    /// Create a new config with the given provider name
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Default::default()
        }
    }

    /// Set the URI
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Set the maximum capacity
    pub fn with_max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }
}

/// Registry entry for cache providers
pub struct CacheProviderEntry {
    /// Unique provider name (e.g., "moka", "redis", "null")
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory function to create provider instance
    pub factory: fn(&CacheProviderConfig) -> Result<Arc<dyn CacheProvider>, String>,
}

#[linkme::distributed_slice]
pub static CACHE_PROVIDERS: [CacheProviderEntry] = [..];

/// Resolve cache provider by name from registry
///
/// # Returns
/// * `Ok(Arc<dyn CacheProvider>)` - Created provider instance
/// * `Err(String)` - Error message if provider not found or creation failed
pub fn resolve_cache_provider(
    config: &CacheProviderConfig,
) -> Result<Arc<dyn CacheProvider>, String> {
    let provider_name = &config.provider;

    for entry in CACHE_PROVIDERS {
        if entry.name == provider_name {
            return (entry.factory)(config);
        }
    }

    let available: Vec<&str> = CACHE_PROVIDERS.iter().map(|e| e.name).collect();
    Err(format!(
        "Unknown cache provider '{provider_name}'. Available providers: {available:?}"
    ))
}

/// List all registered cache providers as (name, description) pairs
pub fn list_cache_providers() -> Vec<(&'static str, &'static str)> {
    CACHE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}
