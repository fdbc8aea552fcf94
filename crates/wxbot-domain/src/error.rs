//! Error handling types

use std::time::Duration;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error carried by operational variants
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for wxbot
///
/// The variants follow the failure classes of the refresh and messaging
/// core: `NotFound` is recoverable, `Timeout` is ambiguous, `Cancelled` is
/// cooperative shutdown, and the rest are operational failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or expired cache key, or an entity the provider cannot resolve
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Cache store transport or serialization failure
    #[error("Store error: {message}")]
    Store {
        /// Description of the store failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Upstream weather provider failure
    #[error("Provider error: {message}")]
    Provider {
        /// Description of the provider failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// The broker rejected a message; it was definitely not delivered
    #[error("Delivery failed: {message}")]
    Delivery {
        /// Broker-supplied reason
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// No outcome was observed in time; delivery status is unknown
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Elapsed deadline
        after: Duration,
    },

    /// Cooperative shutdown interrupted the operation
    #[error("{operation} cancelled")]
    Cancelled {
        /// Operation that observed cancellation
        operation: String,
    },

    /// Partition assignment could not be established
    #[error("Subscription error: {message}")]
    Subscription {
        /// Description of the subscription failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// A client could not be released cleanly
    #[error("Close error: {message}")]
    Close {
        /// Description of the release failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// I/O operation error
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

// Basic error creation methods
impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(operation: S, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }

    /// Create a cancellation error
    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }
}

// Store error creation methods
impl Error {
    /// Create a store error
    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source
    pub fn store_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Provider error creation methods
impl Error {
    /// Create a provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Create a provider error with source
    pub fn provider_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Provider {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Messaging error creation methods
impl Error {
    /// Create a delivery error
    pub fn delivery<S: Into<String>>(message: S) -> Self {
        Self::Delivery {
            message: message.into(),
            source: None,
        }
    }

    /// Create a delivery error with source
    pub fn delivery_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Delivery {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a subscription error
    pub fn subscription<S: Into<String>>(message: S) -> Self {
        Self::Subscription {
            message: message.into(),
            source: None,
        }
    }

    /// Create a subscription error with source
    pub fn subscription_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Subscription {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a close error
    pub fn close<S: Into<String>>(message: S) -> Self {
        Self::Close {
            message: message.into(),
            source: None,
        }
    }

    /// Create a close error with source
    pub fn close_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Close {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification
impl Error {
    /// True for a missing/expired key or an unresolvable entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True when the outcome of the operation is unknown
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// True when the operation stopped because shutdown was requested
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
