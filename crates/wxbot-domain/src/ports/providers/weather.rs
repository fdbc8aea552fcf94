//! Weather Provider Port
//!
//! Boundary to the upstream weather data source. Implementations perform
//! their own retries, if any; callers never retry within one request.

use crate::entities::{Coordinates, Snapshot};
use crate::error::Result;
use async_trait::async_trait;

/// Weather data source
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Resolve a place name to coordinates
    ///
    /// Fails with `NotFound` when the name matches nothing and with
    /// `Provider` on transport or decoding failures.
    async fn resolve_coordinates(&self, name: &str) -> Result<Coordinates>;

    /// Fetch the current conditions at the given coordinates
    ///
    /// Fails with `Provider`.
    async fn fetch_snapshot(&self, coordinates: Coordinates) -> Result<Snapshot>;

    /// Fetch the upcoming forecast at the given coordinates, earliest first
    ///
    /// Fails with `Provider`. An empty list is a valid answer.
    async fn fetch_forecast(&self, coordinates: Coordinates) -> Result<Vec<Snapshot>>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}
