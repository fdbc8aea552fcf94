//! Provider Constants
//!
//! Constants specific to provider implementations. Domain defaults live in
//! `wxbot-domain`.

// ============================================================================
// CACHE PROVIDER CONSTANTS
// ============================================================================

/// Default maximum number of entries held by the in-process cache
pub const CACHE_DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Default Redis connection URL
pub const REDIS_DEFAULT_URL: &str = "redis://localhost:6379";

// ============================================================================
// BROKER PROVIDER CONSTANTS
// ============================================================================

/// Default capacity of the in-process broker's send queue
pub const BROKER_DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Records buffered per partition before a slow reader lags
pub const BROKER_DEFAULT_PARTITION_BUFFER: usize = 1024;

/// Separator between a topic and its partition number in NATS subjects
pub const NATS_PARTITION_SEPARATOR: &str = ".";

// ============================================================================
// WEATHER PROVIDER CONSTANTS
// ============================================================================

/// OpenWeather direct geocoding endpoint
pub const OPENWEATHER_GEO_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";

/// OpenWeather current conditions endpoint
pub const OPENWEATHER_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// OpenWeather 5 day / 3 hour forecast endpoint
pub const OPENWEATHER_FORECAST_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

/// Maximum places returned by a geocoding query
pub const OPENWEATHER_GEOCODING_LIMIT: u32 = 5;

/// Default response language
pub const OPENWEATHER_DEFAULT_LANGUAGE: &str = "ru";

/// Units requested from the API (°C, m/s)
pub const OPENWEATHER_UNITS: &str = "metric";

/// Default HTTP request timeout in seconds
pub const OPENWEATHER_TIMEOUT_SECS: u64 = 10;

/// Error message prefix for request timeouts
pub const ERROR_MSG_REQUEST_TIMEOUT: &str = "Request timed out after";
