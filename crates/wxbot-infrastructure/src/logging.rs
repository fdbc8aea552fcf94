//! Structured logging with tracing
//!
//! Installs one `Registry` with an `EnvFilter`, a stdout layer (text or
//! JSON) and an optional daily-rolling file layer.

use std::ffi::OsStr;
use std::path::Path;

use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use wxbot_domain::error::{Error, Result};

pub use crate::config::LoggingConfig;
use crate::constants::{LOG_FILE_PREFIX, LOG_FILTER_ENV};

/// Initialize logging with the provided configuration
///
/// `WXBOT_LOG` overrides the configured level with a full filter directive.
/// Fails if the level is invalid or a global subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level));

    let file_appender = config.file_output.as_ref().map(|path| {
        tracing_appender::rolling::daily(
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name()
                .unwrap_or_else(|| OsStr::new(LOG_FILE_PREFIX)),
        )
    });

    let registry = Registry::default().with(filter);

    // Layer types differ per format, hence the separate branches
    let installed = if config.json_format {
        let stdout = fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_current_span(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer()
                    .json()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    } else {
        let stdout = fmt::layer().with_target(true).with_thread_names(true);
        match file_appender {
            Some(appender) => {
                let file = fmt::layer()
                    .with_writer(appender)
                    .with_ansi(false)
                    .with_target(true);
                registry.with(stdout).with(file).try_init()
            }
            None => registry.with(stdout).try_init(),
        }
    };

    installed.map_err(|e| Error::configuration_with_source("Failed to install logger", e))?;

    info!(%level, json = config.json_format, "Logging initialized");
    Ok(())
}

/// Parse log level string to tracing Level
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(Error::configuration(format!(
            "Invalid log level: {level}. Use trace, debug, info, warn, or error"
        ))),
    }
}

/// Log configuration loading status
pub fn log_config_loaded(config_path: Option<&Path>) {
    match config_path {
        Some(path) => info!("Configuration loaded from {}", path.display()),
        None => info!("No configuration file found, using defaults and environment"),
    }
}
