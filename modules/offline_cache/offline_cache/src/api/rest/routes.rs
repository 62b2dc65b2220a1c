use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Extension, Router};
use offline_cache_sdk::Fetcher;
use tower_http::trace::TraceLayer;
use url::Url;

use super::handlers;
use crate::domain::OfflineCacheController;

/// Path prefix reserved for the gateway's own endpoints.
pub const CONTROL_PREFIX: &str = "/_offline-cache";

/// Shared state of the offline gateway.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: Arc<OfflineCacheController>,
    /// Used for requests the controller does not intercept
    pub fetcher: Arc<dyn Fetcher>,
    /// Base URL that request paths are resolved against
    pub origin: Url,
}

/// Builds the gateway router.
///
/// Control endpoints live under [`CONTROL_PREFIX`]; every other request goes
/// through the controller.
#[must_use]
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route(
            &format!("{CONTROL_PREFIX}/status"),
            get(handlers::get_status),
        )
        .route(
            &format!("{CONTROL_PREFIX}/message"),
            post(handlers::post_message),
        )
        .fallback(handlers::intercept)
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
