//! Weather Lookup Use Case
//!
//! Read path of the bot. A lookup tries the cache first and falls back to
//! the provider; the location it settles on is remembered per conversation
//! so follow-up requests (forecast, refresh) know which place was meant.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, warn};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::WeatherProvider;
use wxbot_domain::repositories::WeatherCacheRepository;
use wxbot_domain::{ConversationId, SelectedLocation, Snapshot};

/// Where a lookup result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
    Cache,
    Provider,
}

/// Current conditions for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub location: SelectedLocation,
    pub snapshot: Snapshot,
    /// Cache write time, or the lookup time for provider results
    pub as_of: DateTime<Utc>,
    pub source: LookupSource,
}

/// Upcoming conditions for the conversation's selected location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub location: SelectedLocation,
    /// Provider entries, earliest first
    pub entries: Vec<Snapshot>,
}

/// Cache-first weather lookup with per-conversation location state
pub struct WeatherLookupService {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn WeatherCacheRepository>,
    selections: DashMap<ConversationId, SelectedLocation>,
}

impl WeatherLookupService {
    pub fn new(provider: Arc<dyn WeatherProvider>, cache: Arc<dyn WeatherCacheRepository>) -> Self {
        Self {
            provider,
            cache,
            selections: DashMap::new(),
        }
    }

    /// Current conditions for `name`, remembered as the conversation's location
    ///
    /// Any cache failure falls through to the provider. Provider failures
    /// (`NotFound` for unknown places, `Provider` otherwise) are returned and
    /// leave the conversation's previous selection untouched.
    pub async fn current_weather(
        &self,
        conversation: ConversationId,
        name: &str,
    ) -> Result<WeatherReport> {
        let name = name.trim();

        let report = match self.cache.get(name).await {
            Ok(entry) => {
                debug!(%conversation, entity = name, "Weather served from cache");
                WeatherReport {
                    location: SelectedLocation {
                        name: entry.entity_key,
                        coordinates: entry.coordinates,
                    },
                    snapshot: entry.snapshot,
                    as_of: entry.updated_at,
                    source: LookupSource::Cache,
                }
            }
            Err(e) => {
                if !e.is_not_found() {
                    warn!(%conversation, entity = name, error = %e, "Cache read failed");
                }
                self.from_provider(name).await?
            }
        };

        self.selections
            .insert(conversation, report.location.clone());
        Ok(report)
    }

    async fn from_provider(&self, name: &str) -> Result<WeatherReport> {
        let coordinates = self.provider.resolve_coordinates(name).await?;
        let snapshot = self.provider.fetch_snapshot(coordinates).await?;
        Ok(WeatherReport {
            location: SelectedLocation {
                name: name.to_string(),
                coordinates,
            },
            snapshot,
            as_of: Utc::now(),
            source: LookupSource::Provider,
        })
    }

    /// Forecast for the location last selected in `conversation`
    ///
    /// Always asks the provider; forecasts are not cached. `NotFound` when
    /// the conversation has not looked up a place yet.
    pub async fn forecast(&self, conversation: ConversationId) -> Result<ForecastReport> {
        let location = self.selected_location(conversation).ok_or_else(|| {
            Error::not_found(format!("selected location for conversation {conversation}"))
        })?;
        let entries = self.provider.fetch_forecast(location.coordinates).await?;
        debug!(%conversation, entity = %location.name, entries = entries.len(), "Forecast fetched");
        Ok(ForecastReport { location, entries })
    }

    /// Location last selected in `conversation`
    pub fn selected_location(&self, conversation: ConversationId) -> Option<SelectedLocation> {
        self.selections
            .get(&conversation)
            .map(|entry| entry.value().clone())
    }

    /// Drop the conversation's selection (e.g. on `/start`)
    pub fn forget(&self, conversation: ConversationId) -> Option<SelectedLocation> {
        self.selections
            .remove(&conversation)
            .map(|(_, location)| location)
    }

    /// Number of conversations with a remembered location
    pub fn active_conversations(&self) -> usize {
        self.selections.len()
    }
}
