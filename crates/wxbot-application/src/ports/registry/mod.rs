//! Provider Registry System
//!
//! Compile-time registration of providers with `linkme` distributed
//! slices; configuration picks one by name at startup.
//!
//! ```text
//! provider crate:  #[linkme::distributed_slice(CACHE_PROVIDERS)]
//!                  static ENTRY: CacheProviderEntry = ...
//!                        ↓
//! bootstrap:       resolve_cache_provider(&config)  // "moka" → MokaCacheProvider
//! ```
//!
//! ### Registering a Provider (in wxbot-providers)
//!
//! ```ignore
//! use wxbot_application::ports::registry::{CacheProviderEntry, CACHE_PROVIDERS};
//!
//! #[linkme::distributed_slice(CACHE_PROVIDERS)]
//! static NULL_PROVIDER: CacheProviderEntry = CacheProviderEntry {
//!     name: "null",
//!     description: "No-op cache provider",
//!     factory: |_| Ok(Arc::new(NullCacheProvider::new())),
//! };
//! ```

pub mod cache;

pub use cache::{
    CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry, list_cache_providers,
    resolve_cache_provider,
};
