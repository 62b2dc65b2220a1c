//! Error types for the offline cache.

use thiserror::Error;

/// Errors that can occur during offline cache operations.
#[derive(Debug, Error)]
pub enum OfflineCacheError {
    /// Transport-level failure: the request never produced a response
    #[error("Network error for {url}: {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Error message
        message: String,
        /// Source error from the transport
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Response status rejected where a successful response is required
    #[error("Unexpected status {status} for {url}")]
    BadStatus {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Storage backend failure
    #[error("Storage error: {message}")]
    Storage {
        /// Error message
        message: String,
        /// Source error from the backend
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Lifecycle operation attempted in the wrong worker state
    #[error("Invalid lifecycle transition: {message}")]
    Lifecycle {
        /// Error message
        message: String,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message
        message: String,
    },
}

impl OfflineCacheError {
    /// Create a network error with a message only.
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a network error with a source error.
    pub fn network_with_source(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            url: url.into(),
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage error with a message only.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            source: None,
        }
    }

    /// Create a storage error with a source error.
    pub fn storage_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Storage {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a lifecycle error.
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` for transport failures.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}
