//! Configuration for the offline cache.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::DomainError;

/// Offline cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfflineCacheConfig {
    /// Origin serving the application's static files.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Generation tag; bump it to roll out a new asset set.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Paths precached at install time, relative to `origin`.
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Cached page served when the network is unreachable.
    #[serde(default = "default_offline_fallback")]
    pub offline_fallback: String,

    pub storage: StorageConfig,
}

/// Where cache generations are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub kind: StorageKind,

    /// Root directory for the `filesystem` kind.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    #[default]
    Memory,
    Filesystem,
}

fn default_origin() -> String {
    "http://127.0.0.1:3000".to_owned()
}

fn default_cache_name() -> String {
    "calculator-pwa-v1".to_owned()
}

fn default_assets() -> Vec<String> {
    ["/", "/index.html", "/app.js", "/manifest.webmanifest"]
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn default_offline_fallback() -> String {
    "/index.html".to_owned()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data/offline-cache")
}

impl Default for OfflineCacheConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            assets: default_assets(),
            offline_fallback: default_offline_fallback(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            path: default_storage_path(),
        }
    }
}

impl OfflineCacheConfig {
    /// Parses `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] if the origin is not an absolute
    /// `http(s)` URL.
    pub fn origin_url(&self) -> Result<Url, DomainError> {
        let origin = Url::parse(&self.origin)
            .map_err(|e| DomainError::InvalidConfig(format!("origin '{}': {e}", self.origin)))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(DomainError::InvalidConfig(format!(
                "origin '{}' must use http or https",
                self.origin
            )));
        }
        Ok(origin)
    }

    /// Resolves a path or URL against `origin` into a cache key.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] when either part is malformed.
    pub fn resolve(&self, path: &str) -> Result<String, DomainError> {
        let origin = self.origin_url()?;
        origin
            .join(path)
            .map(String::from)
            .map_err(|e| DomainError::InvalidConfig(format!("asset '{path}': {e}")))
    }

    /// Checks every field that can be checked without I/O.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.cache_name.trim().is_empty() {
            return Err(DomainError::InvalidConfig(
                "cache_name must not be empty".to_owned(),
            ));
        }
        for asset in &self.assets {
            self.resolve(asset)?;
        }
        self.resolve(&self.offline_fallback)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
