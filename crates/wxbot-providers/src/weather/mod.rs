//! Weather Provider Implementations
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`OpenWeatherProvider`] | OpenWeather geocoding and current-conditions API |

pub mod openweather;

pub use openweather::{OpenWeatherConfig, OpenWeatherProvider};
