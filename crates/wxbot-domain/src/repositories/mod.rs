//! Repository Interfaces
//!
//! | Repository | Description |
//! |------------|-------------|
//! | [`WeatherCacheRepository`] | Typed, namespaced access to cached weather entries |

/// Weather cache repository interface
pub mod weather_cache;

pub use weather_cache::WeatherCacheRepository;
