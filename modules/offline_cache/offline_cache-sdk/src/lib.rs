//! Offline Cache SDK
//!
//! This crate provides the public API for the `offline_cache` module:
//!
//! - [`Fetcher`] - Network access trait for fetcher implementations
//! - [`CacheStorage`] - Cache generation storage trait for backends
//! - Request, response and lifecycle models
//! - [`OfflineCacheError`] - Error types
//!
//! ## Usage
//!
//! ```
//! use offline_cache_sdk::{ControlMessage, FetchRequest, RequestMode};
//!
//! let request = FetchRequest::navigate("http://localhost:8080/");
//! assert_eq!(request.mode, RequestMode::Navigate);
//!
//! let message = ControlMessage::from_json(&serde_json::json!({ "type": "SKIP_WAITING" }));
//! assert_eq!(message, Some(ControlMessage::SkipWaiting));
//! ```
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::{CacheStorage, Fetcher};
pub use error::OfflineCacheError;
pub use models::{CachedResponse, ControlMessage, FetchRequest, RequestMode, WorkerState};
