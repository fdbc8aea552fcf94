//! Weather entities

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Geographic position of a named entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// A single weather observation captured at one time
///
/// Snapshots are replaced wholesale, never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Human-readable conditions (e.g. "clear", "light rain")
    pub description: String,
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: i64,
    /// Wind speed in m/s
    pub wind_speed: f64,
    /// Observation time reported by the provider, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(description: impl Into<String>, temperature: f64, humidity: i64, wind_speed: f64) -> Self {
        Self {
            description: description.into(),
            temperature,
            humidity,
            wind_speed,
            observed_at: None,
        }
    }

    pub fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = Some(observed_at);
        self
    }
}

/// A cached snapshot for one roster entity
///
/// `updated_at` belongs to the writer: the cache stamps it on every `put`
/// and ignores whatever the caller supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Entity key (city name)
    pub entity_key: String,
    /// Resolved coordinates of the entity
    pub coordinates: Coordinates,
    /// Latest snapshot
    pub snapshot: Snapshot,
    /// Write time, set by the cache
    pub updated_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Build an entry ready to be written; `updated_at` is overwritten on `put`
    pub fn new(entity_key: impl Into<String>, coordinates: Coordinates, snapshot: Snapshot) -> Self {
        Self {
            entity_key: entity_key.into(),
            coordinates,
            snapshot,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

/// Ordered, fixed set of entity keys maintained by the refresh scheduler
///
/// Duplicates are dropped (first occurrence wins) and blank keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Roster {
    keys: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordered: Vec<String> = Vec::new();
        for key in keys {
            let key = key.into();
            let trimmed = key.trim();
            if trimmed.is_empty() {
                return Err(Error::invalid_argument("Roster keys cannot be blank"));
            }
            if !ordered.iter().any(|k| k == trimmed) {
                ordered.push(trimmed.to_string());
            }
        }
        Ok(Self { keys: ordered })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }
}

impl TryFrom<Vec<String>> for Roster {
    type Error = Error;

    fn try_from(keys: Vec<String>) -> Result<Self> {
        Self::new(keys)
    }
}

impl From<Roster> for Vec<String> {
    fn from(roster: Roster) -> Self {
        roster.keys
    }
}

/// Identity of one chat conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationId(pub i64);

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location last selected within a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedLocation {
    pub name: String,
    pub coordinates: Coordinates,
}
