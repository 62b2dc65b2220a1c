#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::header::{ETAG, IF_NONE_MATCH};
use http::{HeaderMap, HeaderValue, StatusCode};
use offline_cache::{InMemoryCacheStorage, OfflineCacheConfig, OfflineCacheController};
use offline_cache_sdk::{CachedResponse, FetchRequest, Fetcher, OfflineCacheError};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

pub const ORIGIN: &str = "http://calc.test";

#[derive(Debug, Clone)]
pub enum Route {
    Respond(u16, &'static str),
    /// 200 carrying the `ETag`, or an empty 304 when `If-None-Match` matches it
    Tagged(&'static str, &'static str),
    Fail,
}

/// Fetcher answering from a URL table, recording every call.
///
/// When gated, each fetch waits for a permit before answering.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
    headers_seen: Mutex<Vec<HeaderMap>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated(gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn route(&self, path: &str, route: Route) {
        self.routes.lock().insert(url(path), route);
    }

    /// Serves every default manifest asset with status 200.
    pub fn serve_assets(&self) {
        for (path, body) in [
            ("/", "<html>root</html>"),
            ("/index.html", "<html>index</html>"),
            ("/app.js", "console.log('calc')"),
            ("/manifest.webmanifest", "{}"),
        ] {
            self.route(path, Route::Respond(200, body));
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Request headers of every fetch, in call order.
    pub fn headers_seen(&self) -> Vec<HeaderMap> {
        self.headers_seen.lock().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<CachedResponse, OfflineCacheError> {
        self.calls.lock().push(request.url.clone());
        self.headers_seen.lock().push(request.headers.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        let route = self.routes.lock().get(&request.url).cloned();
        match route {
            Some(Route::Respond(status, body)) => Ok(CachedResponse::new(
                StatusCode::from_u16(status).unwrap(),
                body,
            )),
            Some(Route::Tagged(etag, body)) => {
                let mut headers = HeaderMap::new();
                headers.insert(ETAG, HeaderValue::from_static(etag));
                let fresh = request
                    .headers
                    .get(IF_NONE_MATCH)
                    .is_some_and(|value| value == etag);
                let response = if fresh {
                    CachedResponse::new(StatusCode::NOT_MODIFIED, "")
                } else {
                    CachedResponse::new(StatusCode::OK, body)
                };
                Ok(response.with_headers(headers))
            }
            Some(Route::Fail) | None => Err(OfflineCacheError::network(
                request.url.clone(),
                "connection refused",
            )),
        }
    }
}

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn config() -> OfflineCacheConfig {
    OfflineCacheConfig {
        origin: ORIGIN.to_owned(),
        ..OfflineCacheConfig::default()
    }
}

pub fn controller(
    fetcher: &Arc<ScriptedFetcher>,
    storage: &Arc<InMemoryCacheStorage>,
) -> OfflineCacheController {
    OfflineCacheController::new(&config(), fetcher.clone(), storage.clone()).unwrap()
}

/// Controller that has already installed and activated the default assets.
pub async fn activated(
    fetcher: &Arc<ScriptedFetcher>,
    storage: &Arc<InMemoryCacheStorage>,
) -> OfflineCacheController {
    fetcher.serve_assets();
    let controller = controller(fetcher, storage);
    controller.install().await.unwrap();
    controller.activate().await.unwrap();
    controller
}
