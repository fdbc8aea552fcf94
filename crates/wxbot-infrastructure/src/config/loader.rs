//! Configuration loader
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. `AppConfig::default()`, with the logging preset of the selected `env`
//! 2. TOML configuration file
//! 3. Environment variables prefixed `WXBOT_`, nested keys split on `__`
//!    (e.g. `WXBOT_CACHE__TTL_SECS=300`)

use std::env;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use wxbot_domain::error::{Error, Result};

use crate::config::{AppConfig, BrokerBackend, Environment, LoggingConfig};
use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_ENV_SEPARATOR, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILENAME,
};
use crate::error_ext::ErrorContext;

/// Configuration loader service
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration file path
    config_path: Option<PathBuf>,

    /// Environment prefix
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader with default settings
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path
    ///
    /// An explicit path must exist; the default locations are optional.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load and validate configuration from all sources
    pub fn load(&self) -> Result<AppConfig> {
        let file = self.resolve_config_path()?;

        // The environment picks the logging preset, so it is read first
        let env: Environment = self
            .layered(Figment::from(Serialized::defaults(AppConfig::default())), file.as_deref())
            .extract_inner("env")
            .config_context("Failed to read 'env'")?;

        let base = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Serialized::default("logging", LoggingConfig::for_env(env)));

        let app_config: AppConfig = self
            .layered(base, file.as_deref())
            .extract()
            .config_context("Failed to extract configuration")?;

        validate_app_config(&app_config)?;
        Ok(app_config)
    }

    /// Write `config` as TOML that [`load`](Self::load) reads back unchanged
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &AppConfig, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), render_toml(config)?)
            .config_context(format!("Failed to write {}", path.as_ref().display()))
    }

    /// File that [`load`](Self::load) reads, if any
    pub fn resolve_config_path(&self) -> Result<Option<PathBuf>> {
        match &self.config_path {
            Some(path) if path.exists() => Ok(Some(path.clone())),
            Some(path) => Err(Error::configuration(format!(
                "Configuration file not found: {}",
                path.display()
            ))),
            None => Ok(Self::find_default_config_path()),
        }
    }

    fn layered(&self, base: Figment, file: Option<&Path>) -> Figment {
        let figment = match file {
            Some(path) => base.merge(Toml::file(path)),
            None => base,
        };
        figment.merge(
            Env::prefixed(&format!("{}_", self.env_prefix)).split(CONFIG_ENV_SEPARATOR),
        )
    }

    /// First existing file among the default locations
    fn find_default_config_path() -> Option<PathBuf> {
        let mut candidates = Vec::new();
        if let Ok(current_dir) = env::current_dir() {
            candidates.push(current_dir.join(DEFAULT_CONFIG_FILENAME));
        }
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(DEFAULT_CONFIG_DIR).join(DEFAULT_CONFIG_FILENAME));
        }
        candidates.into_iter().find(|path| path.exists())
    }
}

/// Effective configuration as pretty TOML
pub fn render_toml(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).config_context("Failed to serialize config to TOML")
}

/// Validate application configuration
///
/// Runs once at startup; every rule reports a `Configuration` error.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_cache_config(config)?;
    validate_weather_config(config)?;
    validate_scheduler_config(config)?;
    validate_broker_config(config)?;
    if config.shutdown_timeout_secs == 0 {
        return Err(Error::configuration("Shutdown timeout cannot be 0"));
    }
    Ok(())
}

fn validate_cache_config(config: &AppConfig) -> Result<()> {
    let cache = &config.cache;
    if cache.ttl_secs == 0 {
        return Err(Error::configuration("Cache TTL cannot be 0"));
    }
    if cache.namespace.trim().is_empty() {
        return Err(Error::configuration("Cache namespace cannot be empty"));
    }
    if cache.provider == "redis" && is_blank(cache.redis_url.as_deref()) {
        return Err(Error::configuration(
            "Redis URL is required when the redis cache provider is selected",
        ));
    }
    Ok(())
}

fn validate_weather_config(config: &AppConfig) -> Result<()> {
    if config.weather.timeout_secs == 0 {
        return Err(Error::configuration("Weather request timeout cannot be 0"));
    }
    Ok(())
}

fn validate_scheduler_config(config: &AppConfig) -> Result<()> {
    let scheduler = &config.scheduler;
    if !scheduler.enabled {
        return Ok(());
    }
    if scheduler.roster.is_empty() {
        return Err(Error::configuration(
            "Roster cannot be empty when the scheduler is enabled",
        ));
    }
    if scheduler.period_secs == Some(0) {
        return Err(Error::configuration("Refresh period cannot be 0"));
    }
    Ok(())
}

fn validate_broker_config(config: &AppConfig) -> Result<()> {
    let broker = &config.broker;
    if !broker.is_enabled() {
        return Ok(());
    }
    if broker.provider == BrokerBackend::Nats && is_blank(broker.nats_url.as_deref()) {
        return Err(Error::configuration(
            "NATS URL is required when the nats broker is selected",
        ));
    }
    if broker.topics.is_empty() {
        return Err(Error::configuration("Broker needs at least one topic"));
    }
    if let Some((topic, partitions)) = broker.topics.iter().find(|(_, p)| **p <= 0) {
        return Err(Error::configuration(format!(
            "Topic '{topic}' must have at least one partition, got {partitions}"
        )));
    }
    let declared = |topic: &String| broker.topics.contains_key(topic);
    if let Some(topic) = broker.consume_topics.iter().find(|t| !declared(t)) {
        return Err(Error::configuration(format!(
            "Consume topic '{topic}' is not declared in broker.topics"
        )));
    }
    if let Some(topic) = broker.notify_topic.as_ref().filter(|t| !declared(t)) {
        return Err(Error::configuration(format!(
            "Notify topic '{topic}' is not declared in broker.topics"
        )));
    }
    if broker.delivery_timeout_ms == 0 {
        return Err(Error::configuration("Delivery timeout cannot be 0"));
    }
    if broker.queue_capacity == 0 {
        return Err(Error::configuration("Broker queue capacity cannot be 0"));
    }
    Ok(())
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}
