//! OpenWeather Provider
//!
//! Implements the `WeatherProvider` port with three OpenWeather endpoints:
//! direct geocoding (place name to coordinates), current conditions and the
//! 3-hourly forecast. Requests carry the API key and ask for metric units.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::{Coordinates, Snapshot};

use crate::constants::{
    ERROR_MSG_REQUEST_TIMEOUT, OPENWEATHER_DEFAULT_LANGUAGE, OPENWEATHER_FORECAST_URL,
    OPENWEATHER_GEO_URL, OPENWEATHER_GEOCODING_LIMIT, OPENWEATHER_TIMEOUT_SECS,
    OPENWEATHER_UNITS, OPENWEATHER_WEATHER_URL,
};
use crate::utils::HttpResponseUtils;

/// Endpoints and request options for [`OpenWeatherProvider`]
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub geo_url: String,
    pub weather_url: String,
    pub forecast_url: String,
    /// Language of the condition descriptions (e.g. "ru", "en")
    pub language: String,
    pub timeout: Duration,
}

impl OpenWeatherConfig {
    /// Config for the public endpoints
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            geo_url: OPENWEATHER_GEO_URL.to_string(),
            weather_url: OPENWEATHER_WEATHER_URL.to_string(),
            forecast_url: OPENWEATHER_FORECAST_URL.to_string(),
            language: OPENWEATHER_DEFAULT_LANGUAGE.to_string(),
            timeout: Duration::from_secs(OPENWEATHER_TIMEOUT_SECS),
        }
    }

    pub fn with_geo_url(mut self, url: impl Into<String>) -> Self {
        self.geo_url = url.into();
        self
    }

    pub fn with_weather_url(mut self, url: impl Into<String>) -> Self {
        self.weather_url = url.into();
        self
    }

    pub fn with_forecast_url(mut self, url: impl Into<String>) -> Self {
        self.forecast_url = url.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct GeoPlace {
    lat: f64,
    lon: f64,
}

/// One observation: the current-weather body, or one item of a forecast list
#[derive(Debug, Deserialize)]
struct ConditionsResponse {
    #[serde(default)]
    weather: Vec<Condition>,
    main: MainReadings,
    wind: Wind,
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ConditionsResponse>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: i64,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
}

impl From<ConditionsResponse> for Snapshot {
    fn from(response: ConditionsResponse) -> Self {
        let description = response
            .weather
            .into_iter()
            .next()
            .map(|c| c.description)
            .unwrap_or_default();
        let snapshot = Snapshot::new(
            description,
            response.main.temp,
            response.main.humidity,
            response.wind.speed,
        );
        match response.dt.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            Some(observed_at) => snapshot.with_observed_at(observed_at),
            None => snapshot,
        }
    }
}

/// OpenWeather API client
///
/// Receives its HTTP client via constructor injection.
///
/// ## Example
///
/// ```rust,no_run
/// use wxbot_providers::weather::{OpenWeatherConfig, OpenWeatherProvider};
/// use reqwest::Client;
///
/// let provider = OpenWeatherProvider::new(OpenWeatherConfig::new("api-key"), Client::new());
/// ```
pub struct OpenWeatherProvider {
    config: OpenWeatherConfig,
    http_client: Client,
}

impl OpenWeatherProvider {
    pub fn new(config: OpenWeatherConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Build a client with the configured timeout
    pub fn from_config(config: OpenWeatherConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::provider_with_source("Failed to create HTTP client", e))?;
        Ok(Self::new(config, http_client))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        base: &str,
        params: &[(&str, String)],
        context: &str,
    ) -> Result<T> {
        let url = Url::parse_with_params(base, params)
            .map_err(|e| Error::provider_with_source(format!("Invalid {context} URL"), e))?;

        let response = self
            .http_client
            .get(url)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::provider(format!(
                        "{context} {} {:?}",
                        ERROR_MSG_REQUEST_TIMEOUT, self.config.timeout
                    ))
                } else {
                    Error::provider_with_source(format!("{context} request failed"), e)
                }
            })?;

        HttpResponseUtils::check_and_parse(response, context).await
    }

    fn conditions_params(&self, coordinates: Coordinates) -> [(&'static str, String); 5] {
        [
            ("lat", coordinates.lat.to_string()),
            ("lon", coordinates.lon.to_string()),
            ("appid", self.config.api_key.clone()),
            ("units", OPENWEATHER_UNITS.to_string()),
            ("lang", self.config.language.clone()),
        ]
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn resolve_coordinates(&self, name: &str) -> Result<Coordinates> {
        let places: Vec<GeoPlace> = self
            .get_json(
                &self.config.geo_url,
                &[
                    ("q", name.to_string()),
                    ("limit", OPENWEATHER_GEOCODING_LIMIT.to_string()),
                    ("appid", self.config.api_key.clone()),
                ],
                "OpenWeather geocoding",
            )
            .await?;

        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("place '{name}'")))?;
        debug!(name, lat = place.lat, lon = place.lon, "Resolved coordinates");
        Ok(Coordinates::new(place.lat, place.lon))
    }

    async fn fetch_snapshot(&self, coordinates: Coordinates) -> Result<Snapshot> {
        let response: ConditionsResponse = self
            .get_json(
                &self.config.weather_url,
                &self.conditions_params(coordinates),
                "OpenWeather current weather",
            )
            .await?;
        Ok(response.into())
    }

    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Snapshot>> {
        let response: ForecastResponse = self
            .get_json(
                &self.config.forecast_url,
                &self.conditions_params(coordinates),
                "OpenWeather forecast",
            )
            .await?;
        debug!(
            lat = coordinates.lat,
            lon = coordinates.lon,
            entries = response.list.len(),
            "Fetched forecast"
        );
        Ok(response.list.into_iter().map(Snapshot::from).collect())
    }

    fn provider_name(&self) -> &str {
        "openweather"
    }
}

impl std::fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("geo_url", &self.config.geo_url)
            .field("weather_url", &self.config.weather_url)
            .field("forecast_url", &self.config.forecast_url)
            .field("language", &self.config.language)
            .finish_non_exhaustive()
    }
}
