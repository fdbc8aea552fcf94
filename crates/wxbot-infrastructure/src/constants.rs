//! Infrastructure layer constants
//!
//! Domain defaults (TTL, roster, retry counts) live in `wxbot_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "wxbot.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "wxbot";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WXBOT";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "WXBOT_LOG";

/// File name prefix of rolling log files
pub const LOG_FILE_PREFIX: &str = "wxbot";

// ============================================================================
// CACHE CONSTANTS
// ============================================================================

/// Default cache backend
pub const DEFAULT_CACHE_PROVIDER: &str = "moka";

// ============================================================================
// BROKER CONSTANTS
// ============================================================================

/// Topic carrying weather updates in the default layout
pub const DEFAULT_WEATHER_TOPIC: &str = "weather-updates";

/// Partition count of the default topic
pub const DEFAULT_TOPIC_PARTITIONS: i32 = 3;

// ============================================================================
// SHUTDOWN CONSTANTS
// ============================================================================

/// Default time allowed for background tasks to stop
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;
