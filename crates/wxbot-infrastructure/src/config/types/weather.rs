//! Weather provider configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wxbot_providers::constants::{
    OPENWEATHER_DEFAULT_LANGUAGE, OPENWEATHER_FORECAST_URL, OPENWEATHER_GEO_URL,
    OPENWEATHER_TIMEOUT_SECS, OPENWEATHER_WEATHER_URL,
};
use wxbot_providers::weather::OpenWeatherConfig;

/// OpenWeather configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// API key sent as `appid`
    pub api_key: String,

    /// Direct geocoding endpoint
    pub geo_url: String,

    /// Current conditions endpoint
    pub weather_url: String,

    /// 3-hourly forecast endpoint
    pub forecast_url: String,

    /// Language of condition descriptions
    pub language: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geo_url: OPENWEATHER_GEO_URL.to_string(),
            weather_url: OPENWEATHER_WEATHER_URL.to_string(),
            forecast_url: OPENWEATHER_FORECAST_URL.to_string(),
            language: OPENWEATHER_DEFAULT_LANGUAGE.to_string(),
            timeout_secs: OPENWEATHER_TIMEOUT_SECS,
        }
    }
}

impl WeatherConfig {
    pub fn to_provider_config(&self) -> OpenWeatherConfig {
        OpenWeatherConfig::new(&self.api_key)
            .with_geo_url(&self.geo_url)
            .with_weather_url(&self.weather_url)
            .with_forecast_url(&self.forecast_url)
            .with_language(&self.language)
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}
