//! Configuration types module

pub mod app;
pub mod broker;
pub mod cache;
pub mod logging;
pub mod scheduler;
pub mod weather;

// Re-export main types
pub use app::*;
pub use broker::{BrokerBackend, BrokerConfig};
pub use cache::CacheConfig;
pub use logging::LoggingConfig;
pub use scheduler::SchedulerConfig;
pub use weather::WeatherConfig;
