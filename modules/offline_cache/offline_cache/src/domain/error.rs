//! Domain errors for the offline cache controller.

use offline_cache_sdk::{OfflineCacheError, WorkerState};
use thiserror::Error;

/// Domain-level errors for offline cache operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Configuration cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Lifecycle step attempted from the wrong state
    #[error("Cannot {operation} a worker in state '{state}'")]
    InvalidState {
        operation: &'static str,
        state: WorkerState,
    },

    /// Precaching failed; the version is discarded
    #[error("Install failed for {cache_name}")]
    InstallFailed {
        cache_name: String,
        #[source]
        source: OfflineCacheError,
    },

    /// Error from a fetcher or storage backend
    #[error(transparent)]
    Backend(#[from] OfflineCacheError),
}

/// Convert domain errors to SDK errors for API boundary.
impl From<DomainError> for OfflineCacheError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidConfig(msg) => {
                OfflineCacheError::internal(format!("Invalid configuration: {msg}"))
            }
            err @ DomainError::InvalidState { .. } => OfflineCacheError::lifecycle(err.to_string()),
            DomainError::InstallFailed { source, .. } | DomainError::Backend(source) => source,
        }
    }
}
