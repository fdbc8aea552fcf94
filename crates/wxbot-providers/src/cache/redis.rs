//! Redis distributed cache provider
//!
//! Values are written with `SET key value EX ttl`, so expiry is Redis's job.
//! The connection is opened on first use and dropped on `close`.
//!
//! ## Example
//!
//! ```ignore
//! use wxbot_providers::cache::RedisCacheProvider;
//!
//! let provider = RedisCacheProvider::new("redis://localhost:6379")?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::Mutex;
use tracing::{debug, info};
use wxbot_domain::error::{Error, Result};
use wxbot_domain::ports::providers::cache::{CacheEntryConfig, CacheProvider};

use crate::constants::REDIS_DEFAULT_URL;

/// Connection slot: `Idle` before first use, `Closed` after `close`
enum Connection {
    Idle,
    Open(ConnectionManager),
    Closed,
}

/// Redis cache provider
pub struct RedisCacheProvider {
    client: Client,
    url: String,
    connection: Mutex<Connection>,
}

impl RedisCacheProvider {
    /// Create a new Redis cache provider with connection string
    ///
    /// No connection is made until the first operation.
    pub fn new(connection_string: &str) -> Result<Self> {
        let client = Client::open(connection_string).map_err(|e| {
            Error::store_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            url: redact_password(connection_string),
            connection: Mutex::new(Connection::Idle),
        })
    }

    /// Get the shared connection, opening it on first use
    async fn get_connection(&self) -> Result<ConnectionManager> {
        let mut slot = self.connection.lock().await;
        match &*slot {
            Connection::Open(conn) => Ok(conn.clone()),
            Connection::Closed => Err(Error::store("redis cache is closed")),
            Connection::Idle => {
                let conn = ConnectionManager::new(self.client.clone())
                    .await
                    .map_err(|e| {
                        Error::store_with_source(format!("Failed to connect to Redis: {e}"), e)
                    })?;
                info!(url = %self.url, "Connected to Redis");
                *slot = Connection::Open(conn.clone());
                Ok(conn)
            }
        }
    }
}

/// Strip credentials from a connection URL before it is logged
fn redact_password(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***{}", &url[..scheme_end + 3], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;

        conn.get(key)
            .await
            .map_err(|e| Error::store_with_source(format!("Redis GET failed: {e}"), e))
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let mut conn = self.get_connection().await?;

        let ttl_seconds = config.effective_ttl().as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, ttl_seconds)
            .await
            .map_err(|e| Error::store_with_source(format!("Redis SET failed: {e}"), e))
    }

    async fn close(&self) -> Result<()> {
        let mut slot = self.connection.lock().await;
        if matches!(*slot, Connection::Open(_)) {
            debug!("Releasing Redis connection");
        }
        *slot = Connection::Closed;
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "redis"
    }
}

impl std::fmt::Debug for RedisCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCacheProvider")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Auto-registration via linkme distributed slice
// ============================================================================

use wxbot_application::ports::registry::{CACHE_PROVIDERS, CacheProviderConfig, CacheProviderEntry};

/// Factory function for creating Redis cache provider instances.
fn redis_cache_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    let uri = config.uri.as_deref().unwrap_or(REDIS_DEFAULT_URL);

    let provider = RedisCacheProvider::new(uri)
        .map_err(|e| format!("Failed to create Redis provider: {e}"))?;

    Ok(Arc::new(provider))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static REDIS_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "redis",
    description: "Redis distributed cache (SET EX)",
    factory: redis_cache_factory,
};
