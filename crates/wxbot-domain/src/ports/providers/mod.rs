//! External Provider Ports
//!
//! | Port | Description |
//! |------|-------------|
//! | CacheProvider | TTL-bounded key/value store |
//! | WeatherProvider | Geocoding and current-conditions source |
//! | BrokerProducerProvider | Topic-addressed send with acknowledgment |
//! | BrokerConsumerProvider | Per-partition read streams |

/// Message broker ports
pub mod broker;
/// Cache provider port
pub mod cache;
/// Weather provider port
pub mod weather;

pub use broker::{
    BrokerConsumerProvider, BrokerProducerProvider, DeliveryFuture, FnHandler, PartitionStream,
    RecordHandler, handler_fn,
};
pub use cache::{CacheEntryConfig, CacheProvider};
pub use weather::WeatherProvider;
