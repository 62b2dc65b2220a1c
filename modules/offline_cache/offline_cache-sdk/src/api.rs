//! Traits implemented by network and storage backends.

use async_trait::async_trait;

use crate::error::OfflineCacheError;
use crate::models::{CachedResponse, FetchRequest};

/// Network access used by the cache controller.
///
/// Any HTTP status is a successful fetch. Implementations return
/// [`OfflineCacheError::Network`] only when no response was received.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a live request.
    ///
    /// # Errors
    ///
    /// Returns a network error when the transport fails.
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, OfflineCacheError>;
}

/// Named cache generations mapping request URLs to stored responses.
///
/// Generation order is creation order. Writes to the same URL are
/// last-writer-wins.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Opens a generation, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the generation cannot be created.
    async fn open(&self, cache_name: &str) -> Result<(), OfflineCacheError>;

    /// Lists generation tags in creation order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    async fn keys(&self) -> Result<Vec<String>, OfflineCacheError>;

    /// Deletes a generation with all its entries.
    ///
    /// Returns `false` when no such generation existed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the generation cannot be removed.
    async fn delete(&self, cache_name: &str) -> Result<bool, OfflineCacheError>;

    /// Stores one response, opening the generation if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the entry cannot be written.
    async fn put(
        &self,
        cache_name: &str,
        url: &str,
        response: &CachedResponse,
    ) -> Result<(), OfflineCacheError>;

    /// Stores a batch of responses in one generation.
    ///
    /// The default implementation stores entries one by one; backends that
    /// can commit a batch as a unit should override it.
    ///
    /// # Errors
    ///
    /// Returns a storage error if any entry cannot be written.
    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(String, CachedResponse)],
    ) -> Result<(), OfflineCacheError> {
        self.open(cache_name).await?;
        for (url, response) in entries {
            self.put(cache_name, url, response).await?;
        }
        Ok(())
    }

    /// Looks up a URL in one generation.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    async fn get(
        &self,
        cache_name: &str,
        url: &str,
    ) -> Result<Option<CachedResponse>, OfflineCacheError>;

    /// Looks up a URL across all generations, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read.
    async fn match_any(&self, url: &str) -> Result<Option<CachedResponse>, OfflineCacheError> {
        for cache_name in self.keys().await? {
            if let Some(found) = self.get(&cache_name, url).await? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}
