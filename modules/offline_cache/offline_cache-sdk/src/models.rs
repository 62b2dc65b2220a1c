//! Request, response and lifecycle models.

use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde::{Deserialize, Serialize};

/// How the request was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestMode {
    /// Top-level page load
    Navigate,
    /// Subresource or programmatic request
    #[default]
    Other,
}

/// Outgoing request seen by the cache controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: Method,
    /// Absolute URL, also the cache key
    pub url: String,
    pub mode: RequestMode,
    /// End-to-end headers forwarded to the network
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchRequest {
    /// Creates a request with an explicit method and mode.
    pub fn new(method: Method, url: impl Into<String>, mode: RequestMode) -> Self {
        Self {
            method,
            url: url.into(),
            mode,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Returns the request with the given headers and body.
    #[must_use]
    pub fn with_payload(mut self, headers: HeaderMap, body: Bytes) -> Self {
        self.headers = headers;
        self.body = body;
        self
    }

    /// A subresource `GET`.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url, RequestMode::Other)
    }

    /// A navigation `GET`.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url, RequestMode::Navigate)
    }

    #[must_use]
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }
}

/// A response as fetched from the network or stored in a cache generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl CachedResponse {
    /// Creates a response without headers.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Returns the response with `headers` replacing the current ones.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Status is in the `2xx` range.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_success()
    }
}

/// Message posted to the worker by a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Activate the waiting version without waiting for pages to close
    #[serde(rename = "SKIP_WAITING")]
    SkipWaiting,
}

impl ControlMessage {
    /// Reads a message from an arbitrary JSON payload.
    ///
    /// Returns `None` for payloads without a recognised `type` marker.
    #[must_use]
    pub fn from_json(payload: &serde_json::Value) -> Option<Self> {
        Self::deserialize(payload).ok()
    }
}

/// Lifecycle of one worker version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    #[default]
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    /// Install failed; this version is discarded
    Redundant,
}

impl WorkerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
