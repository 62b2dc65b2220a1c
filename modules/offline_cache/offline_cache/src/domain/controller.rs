//! Offline cache controller.
//!
//! Install precaches the asset manifest into the current generation, activate
//! purges every other generation, and fetch interception serves navigations
//! network-first and everything else cache-first with a background refresh.

use std::sync::Arc;

use http::{Method, StatusCode};
use offline_cache_sdk::{
    CacheStorage, CachedResponse, ControlMessage, FetchRequest, Fetcher, OfflineCacheError,
    WorkerState,
};
use parking_lot::Mutex;
use tracing::{Instrument, debug, info, warn};

use super::error::DomainError;
use crate::config::OfflineCacheConfig;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Cached offline page served in place of an unreachable resource
    OfflineFallback,
}

impl ResponseSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Cache => "cache",
            Self::OfflineFallback => "offline-fallback",
        }
    }
}

/// Outcome of intercepting one request.
#[derive(Debug)]
pub enum Interception {
    /// Not intercepted; the host performs the request unchanged
    Bypass,
    Respond {
        response: CachedResponse,
        source: ResponseSource,
    },
    /// No live response and no cached fallback
    NetworkError(OfflineCacheError),
}

#[derive(Debug, Default)]
struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
    clients_claimed: bool,
}

/// Cache policy of one worker version.
pub struct OfflineCacheController {
    cache_name: String,
    /// Absolute asset URLs precached at install
    assets: Vec<String>,
    offline_fallback: String,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn CacheStorage>,
    lifecycle: Mutex<Lifecycle>,
}

impl OfflineCacheController {
    /// Creates a controller in the `parsed` state.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] if the configuration does not validate.
    pub fn new(
        config: &OfflineCacheConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn CacheStorage>,
    ) -> Result<Self, DomainError> {
        config.validate()?;
        let assets = config
            .assets
            .iter()
            .map(|asset| config.resolve(asset))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cache_name: config.cache_name.clone(),
            assets,
            offline_fallback: config.resolve(&config.offline_fallback)?,
            fetcher,
            storage,
            lifecycle: Mutex::new(Lifecycle::default()),
        })
    }

    #[must_use]
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    #[must_use]
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.lifecycle.lock().state
    }

    #[must_use]
    pub fn clients_claimed(&self) -> bool {
        self.lifecycle.lock().clients_claimed
    }

    /// Installed and asked to skip waiting.
    #[must_use]
    pub fn should_activate(&self) -> bool {
        let lifecycle = self.lifecycle.lock();
        lifecycle.state == WorkerState::Installed && lifecycle.skip_waiting
    }

    /// Generation tags currently in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be listed.
    pub async fn generations(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.storage.keys().await?)
    }

    /// Precaches every manifest asset.
    ///
    /// Nothing is stored unless every asset was fetched with a `2xx` status.
    /// Also requests skip-waiting, so the new version activates immediately.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the worker is `parsed`, and
    /// [`DomainError::InstallFailed`] when precaching fails; the worker is then
    /// `redundant`.
    #[tracing::instrument(skip_all, fields(cache_name = %self.cache_name))]
    pub async fn install(&self) -> Result<(), DomainError> {
        self.transition("install", WorkerState::Parsed, WorkerState::Installing)?;
        self.skip_waiting();

        match self.precache().await {
            Ok(count) => {
                self.set_state(WorkerState::Installed);
                info!(assets = count, "Worker installed");
                Ok(())
            }
            Err(source) => {
                self.set_state(WorkerState::Redundant);
                warn!(error = %source, "Install failed, worker is redundant");
                Err(DomainError::InstallFailed {
                    cache_name: self.cache_name.clone(),
                    source,
                })
            }
        }
    }

    async fn precache(&self) -> Result<usize, OfflineCacheError> {
        let mut entries = Vec::with_capacity(self.assets.len());
        for url in &self.assets {
            let response = self.fetcher.fetch(&FetchRequest::get(url.as_str())).await?;
            if !response.is_ok() {
                return Err(OfflineCacheError::BadStatus {
                    url: url.clone(),
                    status: response.status.as_u16(),
                });
            }
            entries.push((url.clone(), response));
        }
        self.storage.put_all(&self.cache_name, &entries).await?;
        Ok(entries.len())
    }

    /// Deletes every generation except the current one, then claims clients.
    ///
    /// Returns the deleted tags. Calling it on an activated worker is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidState`] unless the worker is `installed`,
    /// or a backend error if storage fails; the worker then stays `installed`.
    #[tracing::instrument(skip_all, fields(cache_name = %self.cache_name))]
    pub async fn activate(&self) -> Result<Vec<String>, DomainError> {
        if self.state() == WorkerState::Activated {
            return Ok(Vec::new());
        }
        self.transition("activate", WorkerState::Installed, WorkerState::Activating)?;

        match self.purge_stale_generations().await {
            Ok(deleted) => {
                self.set_state(WorkerState::Activated);
                info!(deleted = deleted.len(), "Worker activated");
                self.claim();
                Ok(deleted)
            }
            Err(err) => {
                self.set_state(WorkerState::Installed);
                Err(err.into())
            }
        }
    }

    async fn purge_stale_generations(&self) -> Result<Vec<String>, OfflineCacheError> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name != self.cache_name {
                self.storage.delete(&name).await?;
                info!(generation = %name, "Deleted stale cache generation");
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Marks the worker to activate as soon as it is installed.
    pub fn skip_waiting(&self) {
        let mut lifecycle = self.lifecycle.lock();
        if !lifecycle.skip_waiting {
            lifecycle.skip_waiting = true;
            debug!(state = %lifecycle.state, "Skip waiting requested");
        }
    }

    /// Takes control of already-open clients.
    pub fn claim(&self) {
        self.lifecycle.lock().clients_claimed = true;
        info!(cache_name = %self.cache_name, "Clients claimed");
    }

    /// Handles a message posted by a page.
    ///
    /// Returns the recognised message, or `None` when the payload was ignored.
    pub fn on_message(&self, payload: &serde_json::Value) -> Option<ControlMessage> {
        let message = ControlMessage::from_json(payload);
        if let Some(ControlMessage::SkipWaiting) = message {
            self.skip_waiting();
        } else {
            debug!("Ignoring unrecognised message");
        }
        message
    }

    /// Intercepts one outgoing request.
    ///
    /// Never fails: storage errors are logged and network errors fall back to
    /// the cached offline page when there is one.
    #[tracing::instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Interception {
        if request.method != Method::GET {
            return Interception::Bypass;
        }
        if request.is_navigation() {
            self.network_first(request).await
        } else {
            self.cache_first(request).await
        }
    }

    async fn network_first(&self, request: &FetchRequest) -> Interception {
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                self.store(&request.url, &response).await;
                Interception::Respond {
                    response,
                    source: ResponseSource::Network,
                }
            }
            Err(err) => {
                debug!(error = %err, "Navigation failed");
                self.offline_fallback(err).await
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Interception {
        let cached = self.storage.match_any(&request.url).await.unwrap_or_else(|err| {
            warn!(error = %err, "Cache lookup failed, treating as miss");
            None
        });
        if let Some(response) = cached {
            self.spawn_refresh(request.clone());
            return Interception::Respond {
                response,
                source: ResponseSource::Cache,
            };
        }

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if response.status == StatusCode::OK {
                    self.store(&request.url, &response).await;
                }
                Interception::Respond {
                    response,
                    source: ResponseSource::Network,
                }
            }
            Err(err) => self.offline_fallback(err).await,
        }
    }

    /// Refreshes a cached entry without holding up the response.
    fn spawn_refresh(&self, request: FetchRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let storage = Arc::clone(&self.storage);
        let cache_name = self.cache_name.clone();

        tokio::spawn(
            async move {
                match fetcher.fetch(&request).await {
                    Ok(fresh) if fresh.is_ok() => {
                        if let Err(err) = storage.put(&cache_name, &request.url, &fresh).await {
                            warn!(error = %err, "Background refresh not stored");
                        } else {
                            debug!("Background refresh stored");
                        }
                    }
                    Ok(fresh) => debug!(status = %fresh.status, "Background refresh skipped"),
                    Err(err) => debug!(error = %err, "Background refresh failed"),
                }
            }
            .in_current_span(),
        );
    }

    async fn store(&self, url: &str, response: &CachedResponse) {
        if let Err(err) = self.storage.put(&self.cache_name, url, response).await {
            warn!(error = %err, url, "Failed to store response");
        }
    }

    async fn offline_fallback(&self, err: OfflineCacheError) -> Interception {
        match self.storage.match_any(&self.offline_fallback).await {
            Ok(Some(response)) => Interception::Respond {
                response,
                source: ResponseSource::OfflineFallback,
            },
            Ok(None) => Interception::NetworkError(err),
            Err(lookup) => {
                warn!(error = %lookup, "Offline fallback lookup failed");
                Interception::NetworkError(err)
            }
        }
    }

    fn transition(
        &self,
        operation: &'static str,
        from: WorkerState,
        to: WorkerState,
    ) -> Result<(), DomainError> {
        let mut lifecycle = self.lifecycle.lock();
        if lifecycle.state != from {
            return Err(DomainError::InvalidState {
                operation,
                state: lifecycle.state,
            });
        }
        lifecycle.state = to;
        Ok(())
    }

    fn set_state(&self, state: WorkerState) {
        self.lifecycle.lock().state = state;
    }
}
