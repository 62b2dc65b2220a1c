//! In-memory cache storage.

use std::collections::HashMap;

use async_trait::async_trait;
use offline_cache_sdk::{CacheStorage, CachedResponse, OfflineCacheError};
use parking_lot::RwLock;

#[derive(Debug)]
struct Generation {
    name: String,
    entries: HashMap<String, CachedResponse>,
}

impl Generation {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            entries: HashMap::new(),
        }
    }
}

/// Cache generations held in process memory, lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryCacheStorage {
    generations: RwLock<Vec<Generation>>,
}

impl InMemoryCacheStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn open_in<'a>(generations: &'a mut Vec<Generation>, cache_name: &str) -> &'a mut Generation {
    let index = generations
        .iter()
        .position(|g| g.name == cache_name)
        .unwrap_or_else(|| {
            generations.push(Generation::new(cache_name));
            generations.len() - 1
        });
    &mut generations[index]
}

#[async_trait]
impl CacheStorage for InMemoryCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<(), OfflineCacheError> {
        open_in(&mut self.generations.write(), cache_name);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, OfflineCacheError> {
        Ok(self
            .generations
            .read()
            .iter()
            .map(|g| g.name.clone())
            .collect())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, OfflineCacheError> {
        let mut generations = self.generations.write();
        let before = generations.len();
        generations.retain(|g| g.name != cache_name);
        Ok(generations.len() != before)
    }

    async fn put(
        &self,
        cache_name: &str,
        url: &str,
        response: &CachedResponse,
    ) -> Result<(), OfflineCacheError> {
        open_in(&mut self.generations.write(), cache_name)
            .entries
            .insert(url.to_owned(), response.clone());
        Ok(())
    }

    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(String, CachedResponse)],
    ) -> Result<(), OfflineCacheError> {
        let mut generations = self.generations.write();
        let generation = open_in(&mut generations, cache_name);
        for (url, response) in entries {
            generation.entries.insert(url.clone(), response.clone());
        }
        Ok(())
    }

    async fn get(
        &self,
        cache_name: &str,
        url: &str,
    ) -> Result<Option<CachedResponse>, OfflineCacheError> {
        Ok(self
            .generations
            .read()
            .iter()
            .find(|g| g.name == cache_name)
            .and_then(|g| g.entries.get(url).cloned()))
    }

    async fn match_any(&self, url: &str) -> Result<Option<CachedResponse>, OfflineCacheError> {
        Ok(self
            .generations
            .read()
            .iter()
            .find_map(|g| g.entries.get(url).cloned()))
    }
}
