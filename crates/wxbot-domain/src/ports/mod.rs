//! Domain Port Interfaces
//!
//! Boundary contracts implemented by `wxbot-providers`. High-level code
//! depends on these traits only.

/// External service provider ports
pub mod providers;

pub use providers::{
    BrokerConsumerProvider, BrokerProducerProvider, CacheEntryConfig, CacheProvider,
    DeliveryFuture, FnHandler, PartitionStream, RecordHandler, WeatherProvider, handler_fn,
};
