//! Domain constants

/// Namespace prefix for cached weather entries (`weather:<entity>`)
pub const WEATHER_CACHE_NAMESPACE: &str = "weather";

/// Separator between namespace and entity key
pub const CACHE_KEY_SEPARATOR: &str = ":";

/// Default cache TTL in seconds (10 minutes)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Default broker-side retry count for outbound messages
pub const DEFAULT_PRODUCER_MAX_RETRIES: u32 = 5;

/// Default per-call delivery timeout in milliseconds
pub const DEFAULT_DELIVERY_TIMEOUT_MS: u64 = 15_000;

/// Cities kept warm by the refresh scheduler when none are configured
pub const DEFAULT_ROSTER: &[&str] = &["Санкт-Петербург", "Москва", "Коломна", "Орск"];
