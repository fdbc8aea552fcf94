//! # wxbot - Provider Implementations
//!
//! Concrete implementations of the ports defined in `wxbot-domain`.
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Broker | `BrokerProducerProvider` / `BrokerConsumerProvider` | Tokio (in-process), NATS JetStream |
//! | Weather | `WeatherProvider` | OpenWeather |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! wxbot-providers = { version = "0.1", default-features = false, features = ["cache-redis", "broker-nats"] }
//! ```

pub use wxbot_domain::error::{Error, Result};
pub use wxbot_domain::ports::providers::{
    BrokerConsumerProvider, BrokerProducerProvider, CacheProvider, WeatherProvider,
};

/// Provider-specific constants
pub mod constants;

/// Shared utilities for provider implementations
pub mod utils;

/// Cache provider implementations
pub mod cache;

/// Message broker implementations
pub mod broker;

/// Weather data source implementations
pub mod weather;
