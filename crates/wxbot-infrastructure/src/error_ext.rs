//! Error extension utilities
//!
//! Context helpers that turn foreign errors into the matching domain variant.

use std::fmt;

use wxbot_domain::error::{Error, Result};

/// Extension trait for adding context to errors
///
/// # Example
///
/// ```ignore
/// use wxbot_infrastructure::error_ext::ErrorContext;
///
/// let entry: CacheEntry = serde_json::from_str(&json)
///     .store_context(format!("Corrupt cache entry '{key}'"))?;
///
/// let config: AppConfig = figment.extract().config_context("Failed to extract configuration")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context for cache store operations
    fn store_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for weather provider operations
    fn provider_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for broker subscription operations
    fn subscription_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for resource release
    fn close_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn store_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Store {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn provider_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Provider {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn subscription_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Subscription {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn close_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Close {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }
}
