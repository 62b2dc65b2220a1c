//! Filesystem cache storage.
//!
//! Layout under the root directory:
//!
//! ```text
//! generations.json            creation-ordered generation tags
//! <hex(tag)>/<sha256(url)>.entry
//! ```
//!
//! An entry file holds one line of JSON metadata (url, status, headers)
//! followed by the raw body. Entries are replaced with a single rename, and
//! batches are staged in a scratch directory before they are moved into place.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use offline_cache_sdk::{CacheStorage, CachedResponse, OfflineCacheError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;
use tracing::{debug, warn};

const MANIFEST_FILE: &str = "generations.json";
const ENTRY_EXTENSION: &str = "entry";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
}

impl EntryMeta {
    fn new(url: &str, response: &CachedResponse) -> Self {
        Self {
            url: url.to_owned(),
            status: response.status.as_u16(),
            headers: response
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_owned(), v.to_owned()))
                })
                .collect(),
        }
    }

    fn into_response(self, body: Bytes) -> Result<CachedResponse, OfflineCacheError> {
        let status = StatusCode::from_u16(self.status).map_err(|e| {
            OfflineCacheError::storage_with_source(format!("bad stored status for {}", self.url), e)
        })?;
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                headers.append(name, value);
            }
        }
        Ok(CachedResponse::new(status, body).with_headers(headers))
    }
}

/// Serialises an entry as `<json metadata>\n<body>`.
///
/// Compact JSON escapes newlines inside strings, so the first `\n` always ends
/// the metadata.
fn encode_entry(url: &str, response: &CachedResponse) -> Result<Vec<u8>, OfflineCacheError> {
    let mut raw = serde_json::to_vec(&EntryMeta::new(url, response))
        .map_err(|e| OfflineCacheError::storage_with_source("serialize entry", e))?;
    raw.push(b'\n');
    raw.extend_from_slice(&response.body);
    Ok(raw)
}

fn decode_entry(path: &Path, raw: &[u8]) -> Result<(EntryMeta, Bytes), OfflineCacheError> {
    let Some(split) = raw.iter().position(|b| *b == b'\n') else {
        return Err(OfflineCacheError::storage(format!(
            "truncated entry {}",
            path.display()
        )));
    };
    let meta = serde_json::from_slice(&raw[..split]).map_err(|e| {
        OfflineCacheError::storage_with_source(format!("parse {}", path.display()), e)
    })?;
    Ok((meta, Bytes::copy_from_slice(&raw[split + 1..])))
}

fn entry_file_name(url: &str) -> String {
    format!(
        "{}.{ENTRY_EXTENSION}",
        hex::encode(Sha256::digest(url.as_bytes()))
    )
}

/// Cache generations persisted on disk; survives restarts.
#[derive(Debug)]
pub struct FsCacheStorage {
    root: PathBuf,
    /// Serialises manifest read-modify-write cycles
    manifest_lock: Mutex<()>,
    tmp_counter: AtomicU64,
}

impl FsCacheStorage {
    /// Creates storage rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self, OfflineCacheError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| io_error(format!("create {}", root.display()), e))?;
        Ok(Self {
            root,
            manifest_lock: Mutex::new(()),
            tmp_counter: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn generation_dir(&self, cache_name: &str) -> PathBuf {
        self.root.join(hex::encode(cache_name.as_bytes()))
    }

    fn entry_path(&self, cache_name: &str, url: &str) -> PathBuf {
        self.generation_dir(cache_name).join(entry_file_name(url))
    }

    fn next_seq(&self) -> u64 {
        self.tmp_counter.fetch_add(1, Ordering::Relaxed)
    }

    async fn read_manifest(&self) -> Result<Vec<String>, OfflineCacheError> {
        let path = self.root.join(MANIFEST_FILE);
        match tokio::fs::read(&path).await {
            Ok(raw) => serde_json::from_slice(&raw).map_err(|e| {
                OfflineCacheError::storage_with_source(format!("parse {}", path.display()), e)
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(format!("read {}", path.display()), e)),
        }
    }

    async fn write_manifest(&self, names: &[String]) -> Result<(), OfflineCacheError> {
        let raw = serde_json::to_vec_pretty(names)
            .map_err(|e| OfflineCacheError::storage_with_source("serialize manifest", e))?;
        self.write_atomic(&self.root.join(MANIFEST_FILE), &raw).await
    }

    /// Writes via a temporary file and rename so readers never see partial data.
    async fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<(), OfflineCacheError> {
        let tmp = path.with_extension(format!("tmp{}", self.next_seq()));
        tokio::fs::write(&tmp, data)
            .await
            .map_err(|e| io_error(format!("write {}", tmp.display()), e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(format!("rename {}", path.display()), e))
    }

    async fn open_generation(&self, cache_name: &str) -> Result<PathBuf, OfflineCacheError> {
        let _guard = self.manifest_lock.lock().await;
        let dir = self.generation_dir(cache_name);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(format!("create {}", dir.display()), e))?;

        let mut names = self.read_manifest().await?;
        if !names.iter().any(|n| n == cache_name) {
            names.push(cache_name.to_owned());
            self.write_manifest(&names).await?;
            debug!(cache_name, "Created cache generation");
        }
        Ok(dir)
    }

    /// Moves a staged batch into its generation.
    ///
    /// A generation not yet in the manifest is created by renaming the whole
    /// scratch directory, then registered; nothing becomes visible on failure.
    async fn commit(
        &self,
        cache_name: &str,
        staging: &Path,
        entries: &[(String, CachedResponse)],
    ) -> Result<(), OfflineCacheError> {
        let _guard = self.manifest_lock.lock().await;
        let dir = self.generation_dir(cache_name);
        let mut names = self.read_manifest().await?;

        if names.iter().any(|n| n == cache_name) {
            let mut staged = tokio::fs::read_dir(staging)
                .await
                .map_err(|e| io_error(format!("list {}", staging.display()), e))?;
            while let Some(file) = staged
                .next_entry()
                .await
                .map_err(|e| io_error(format!("list {}", staging.display()), e))?
            {
                tokio::fs::rename(file.path(), dir.join(file.file_name()))
                    .await
                    .map_err(|e| io_error(format!("rename into {}", dir.display()), e))?;
            }
            return Ok(());
        }

        // Unregistered directories are leftovers of an interrupted delete.
        if let Ok(meta) = tokio::fs::symlink_metadata(&dir).await
            && meta.is_dir()
        {
            tokio::fs::remove_dir_all(&dir)
                .await
                .map_err(|e| io_error(format!("remove stale {}", dir.display()), e))?;
        }
        tokio::fs::rename(staging, &dir)
            .await
            .map_err(|e| io_error(format!("rename {}", dir.display()), e))?;

        names.push(cache_name.to_owned());
        if let Err(err) = self.write_manifest(&names).await {
            remove_dir_quietly(&dir).await;
            return Err(err);
        }
        debug!(cache_name, entries = entries.len(), "Created cache generation");
        Ok(())
    }
}

fn io_error(message: String, source: io::Error) -> OfflineCacheError {
    OfflineCacheError::storage_with_source(message, source)
}

/// Writes every entry of a batch into a fresh scratch directory.
async fn stage_batch(
    staging: &Path,
    entries: &[(String, CachedResponse)],
) -> Result<(), OfflineCacheError> {
    tokio::fs::create_dir_all(staging)
        .await
        .map_err(|e| io_error(format!("create {}", staging.display()), e))?;
    for (url, response) in entries {
        let path = staging.join(entry_file_name(url));
        tokio::fs::write(&path, encode_entry(url, response)?)
            .await
            .map_err(|e| io_error(format!("write {}", path.display()), e))?;
    }
    Ok(())
}

async fn remove_dir_quietly(dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(dir).await
        && e.kind() != io::ErrorKind::NotFound
    {
        warn!(path = %dir.display(), error = %e, "Failed to remove directory");
    }
}

#[async_trait]
impl CacheStorage for FsCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<(), OfflineCacheError> {
        self.open_generation(cache_name).await.map(drop)
    }

    async fn keys(&self) -> Result<Vec<String>, OfflineCacheError> {
        let _guard = self.manifest_lock.lock().await;
        self.read_manifest().await
    }

    async fn delete(&self, cache_name: &str) -> Result<bool, OfflineCacheError> {
        let _guard = self.manifest_lock.lock().await;
        let mut names = self.read_manifest().await?;
        let before = names.len();
        names.retain(|n| n != cache_name);
        if names.len() == before {
            return Ok(false);
        }
        self.write_manifest(&names).await?;

        let dir = self.generation_dir(cache_name);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(io_error(format!("remove {}", dir.display()), e)),
        }
    }

    async fn put(
        &self,
        cache_name: &str,
        url: &str,
        response: &CachedResponse,
    ) -> Result<(), OfflineCacheError> {
        let dir = self.open_generation(cache_name).await?;
        self.write_atomic(&dir.join(entry_file_name(url)), &encode_entry(url, response)?)
            .await
    }

    async fn put_all(
        &self,
        cache_name: &str,
        entries: &[(String, CachedResponse)],
    ) -> Result<(), OfflineCacheError> {
        let staging = self
            .root
            .join(format!("{STAGING_PREFIX}{}", self.next_seq()));
        let result = match stage_batch(&staging, entries).await {
            Ok(()) => self.commit(cache_name, &staging, entries).await,
            Err(err) => Err(err),
        };
        remove_dir_quietly(&staging).await;
        result
    }

    async fn get(
        &self,
        cache_name: &str,
        url: &str,
    ) -> Result<Option<CachedResponse>, OfflineCacheError> {
        let path = self.entry_path(cache_name, url);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(format!("read {}", path.display()), e)),
        };
        let (meta, body) = decode_entry(&path, &raw)?;
        if meta.url != url {
            return Ok(None);
        }
        meta.into_response(body).map(Some)
    }
}
