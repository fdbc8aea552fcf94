//! Use cases

pub mod cache_refresh;
pub mod weather_lookup;

pub use cache_refresh::{
    RefreshFailure, RefreshScheduler, RefreshStage, RefreshStats, RefreshStatsSnapshot,
    SweepObserver, SweepReport,
};
pub use weather_lookup::{ForecastReport, LookupSource, WeatherLookupService, WeatherReport};
