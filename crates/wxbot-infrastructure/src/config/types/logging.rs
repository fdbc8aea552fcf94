//! Logging configuration types

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::Environment;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl LoggingConfig {
    /// Preset for a deployment environment
    ///
    /// `local` logs debug text, `dev` debug JSON, `prod` info JSON.
    pub fn for_env(env: Environment) -> Self {
        let (level, json_format) = match env {
            Environment::Local => ("debug", false),
            Environment::Dev => ("debug", true),
            Environment::Prod => ("info", true),
        };
        Self {
            level: level.to_string(),
            json_format,
            file_output: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_env(Environment::default())
    }
}
