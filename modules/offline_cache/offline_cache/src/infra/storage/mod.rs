pub mod fs;
pub mod memory;

use std::sync::Arc;

use offline_cache_sdk::{CacheStorage, OfflineCacheError};
use tracing::info;

use crate::config::{StorageConfig, StorageKind};

pub use fs::FsCacheStorage;
pub use memory::InMemoryCacheStorage;

/// Builds the storage backend selected by configuration.
///
/// # Errors
///
/// Returns a storage error if the filesystem root cannot be created.
pub async fn storage_from_config(
    config: &StorageConfig,
) -> Result<Arc<dyn CacheStorage>, OfflineCacheError> {
    match config.kind {
        StorageKind::Memory => {
            info!("Using in-memory cache storage");
            Ok(Arc::new(InMemoryCacheStorage::new()))
        }
        StorageKind::Filesystem => {
            info!(path = %config.path.display(), "Using filesystem cache storage");
            Ok(Arc::new(FsCacheStorage::new(config.path.clone()).await?))
        }
    }
}
