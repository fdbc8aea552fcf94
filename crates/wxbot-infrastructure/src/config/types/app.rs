//! Application configuration root

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{BrokerConfig, CacheConfig, LoggingConfig, SchedulerConfig, WeatherConfig};
use crate::constants::DEFAULT_SHUTDOWN_TIMEOUT_SECS;

/// Deployment environment
///
/// Picks the logging preset when the `logging` section is not configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Dev,
    Prod,
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Deployment environment
    pub env: Environment,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Cache backend and entry TTL
    pub cache: CacheConfig,

    /// Weather provider endpoints and credentials
    pub weather: WeatherConfig,

    /// Background refresh of the roster
    pub scheduler: SchedulerConfig,

    /// Message broker
    pub broker: BrokerConfig,

    /// Time allowed for background tasks to stop
    pub shutdown_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            logging: LoggingConfig::for_env(Environment::default()),
            cache: CacheConfig::default(),
            weather: WeatherConfig::default(),
            scheduler: SchedulerConfig::default(),
            broker: BrokerConfig::default(),
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    /// Refresh period: `scheduler.period_secs`, else the cache TTL
    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.scheduler.period_secs.unwrap_or(self.cache.ttl_secs))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
