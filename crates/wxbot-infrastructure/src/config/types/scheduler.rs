//! Refresh scheduler configuration types

use serde::{Deserialize, Serialize};
use wxbot_domain::Roster;
use wxbot_domain::constants::DEFAULT_ROSTER;

/// Roster refresh configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Run the refresh loop
    pub enabled: bool,

    /// Entities kept warm, refreshed in this order
    pub roster: Roster,

    /// Tick period in seconds; the cache TTL when unset
    pub period_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            roster: Roster::new(DEFAULT_ROSTER.iter().copied()).unwrap_or_default(),
            period_secs: None,
        }
    }
}
