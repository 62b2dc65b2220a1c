#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Offline Cache
//!
//! Cache policy that lets the calculator web app load without a network:
//!
//! - [`OfflineCacheController`] - install, activate and fetch interception
//! - [`InMemoryCacheStorage`] / [`FsCacheStorage`] - cache generation backends
//! - [`HttpFetcher`] - live network access
//! - [`api::rest`] - an HTTP gateway that puts the controller in front of an origin
//!
//! ## Usage
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use offline_cache::{HttpFetcher, InMemoryCacheStorage, OfflineCacheConfig, OfflineCacheController};
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OfflineCacheConfig::default();
//! let controller = OfflineCacheController::new(
//!     &config,
//!     Arc::new(HttpFetcher::new()),
//!     Arc::new(InMemoryCacheStorage::new()),
//! )?;
//!
//! controller.install().await?;
//! if controller.should_activate() {
//!     controller.activate().await?;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;

pub use config::{OfflineCacheConfig, StorageConfig, StorageKind};
pub use domain::{DomainError, Interception, OfflineCacheController, ResponseSource};
pub use infra::fetcher::HttpFetcher;
pub use infra::storage::{FsCacheStorage, InMemoryCacheStorage, storage_from_config};
