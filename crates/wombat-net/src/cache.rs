//! On-disk HTTP cache.
//!
//! One file per URL, named `{key}.{ext}` where `key` is the first 16 hex
//! digits of the URL's SHA3-256 and `ext` follows the response's content
//! type. The file's modification time encodes freshness: an entry is fresh
//! while `mtime > now - fresh_time`, may be revalidated while
//! `mtime > now - max_time`, and is discarded after that. The creation time
//! records when the content was originally fetched.

use std::fmt::Write;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use headers::{CacheControl, HeaderMapExt};
use http::HeaderMap;
use sha3::{Digest, Sha3_256};
use tracing::{debug, trace, warn};

use crate::Download;
use crate::config::HttpCacheConfig;
use crate::error::DownloadError;
use crate::mime::{extension_for_mime, mime_for_extension};

/// A cache file and its timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Cache file.
    pub path: PathBuf,
    /// Freshness marker.
    pub modified: SystemTime,
    /// When the content was fetched.
    pub fetched: SystemTime,
}

impl CacheEntry {
    /// Read the cached copy; the MIME type follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the file cannot be read.
    pub async fn read(&self) -> Result<Download, DownloadError> {
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| DownloadError::io(&self.path, e))?;
        let mime = self
            .path
            .extension()
            .and_then(|extension| extension.to_str())
            .map(mime_for_extension)
            .unwrap_or_default();
        Ok(Download { data, mime })
    }
}

/// What the cache holds for a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// Nothing usable.
    Missing,
    /// Serve without asking the server.
    Fresh(CacheEntry),
    /// Ask the server whether it changed since it was fetched.
    Stale(CacheEntry),
}

/// A cache directory with its freshness limits.
#[derive(Debug, Clone)]
pub struct HttpCache {
    dir: PathBuf,
    fresh_time: Duration,
    max_time: Duration,
}

impl HttpCache {
    /// The cache described by `config`, or `None` when it has no directory.
    #[must_use]
    pub fn from_config(config: &HttpCacheConfig) -> Option<Self> {
        Some(Self {
            dir: config.dir.clone()?,
            fresh_time: config.fresh_time,
            max_time: config.max_time,
        })
    }

    /// Cache file name stem for `url`.
    #[must_use]
    pub fn key(url: &str) -> String {
        Sha3_256::digest(url.as_bytes())
            .iter()
            .take(8)
            .fold(String::with_capacity(16), |mut key, byte| {
                let _ = write!(key, "{byte:02x}");
                key
            })
    }

    /// Classify the cached copy of `url`, deleting expired or ambiguous ones.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the cache directory cannot be read.
    pub async fn lookup(&self, url: &str) -> Result<CacheState, DownloadError> {
        let mut files = self.files(url).await?;
        if files.len() > 1 {
            debug!(url, count = files.len(), "conflicting cache entries");
            remove_files(&files).await;
            return Ok(CacheState::Missing);
        }
        let Some(path) = files.pop() else {
            return Ok(CacheState::Missing);
        };

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;
        let modified = metadata
            .modified()
            .map_err(|e| DownloadError::io(&path, e))?;
        let fetched = metadata.created().unwrap_or(modified);
        let entry = CacheEntry {
            path,
            modified,
            fetched,
        };

        let now = SystemTime::now();
        if modified > earlier(now, self.fresh_time) {
            Ok(CacheState::Fresh(entry))
        } else if modified > earlier(now, self.max_time) {
            Ok(CacheState::Stale(entry))
        } else {
            trace!(url, "cache entry expired");
            remove_files(std::slice::from_ref(&entry.path)).await;
            Ok(CacheState::Missing)
        }
    }

    /// Save a `200 OK` response, honoring its `Cache-Control` header.
    ///
    /// Returns whether the response was stored.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the file cannot be written.
    pub async fn store(
        &self,
        url: &str,
        download: &Download,
        headers: &HeaderMap,
    ) -> Result<bool, DownloadError> {
        let old = self.files(url).await?;
        remove_files(&old).await;

        let Some(modified) = self.freshness(headers) else {
            trace!(url, "response not cacheable");
            return Ok(false);
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DownloadError::io(&self.dir, e))?;
        let path = self.dir.join(format!(
            "{}.{}",
            Self::key(url),
            extension_for_mime(&download.mime)
        ));
        tokio::fs::write(&path, &download.data)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;
        set_modified(&path, modified).await?;
        debug!(url, path = %path.display(), "cached response");
        Ok(true)
    }

    /// Renew an entry after `304 Not Modified`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] when the file time cannot be set.
    pub async fn refresh(&self, entry: &CacheEntry, headers: &HeaderMap) -> Result<(), DownloadError> {
        match self.freshness(headers) {
            Some(modified) => set_modified(&entry.path, modified).await,
            None => {
                remove_files(std::slice::from_ref(&entry.path)).await;
                Ok(())
            }
        }
    }

    /// Modification time encoding the freshness a response asks for, or
    /// `None` when it must not be stored.
    fn freshness(&self, headers: &HeaderMap) -> Option<SystemTime> {
        let now = SystemTime::now();
        let stale_now = earlier(now, self.fresh_time);
        let Some(control) = headers.typed_get::<CacheControl>() else {
            return Some(now);
        };

        let max_age = control.max_age();
        if control.no_store() || max_age.is_some_and(|age| age.is_zero()) {
            return None;
        }
        if control.must_revalidate() || control.no_cache() {
            return Some(stale_now);
        }
        Some(max_age.map_or(now, |age| (stale_now + age).min(now)))
    }

    async fn files(&self, url: &str) -> Result<Vec<PathBuf>, DownloadError> {
        let prefix = format!("{}.", Self::key(url));
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DownloadError::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DownloadError::io(&self.dir, e))?
        {
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                files.push(entry.path());
            }
        }
        Ok(files)
    }
}

async fn remove_files(files: &[PathBuf]) {
    for file in files {
        if let Err(error) = tokio::fs::remove_file(file).await {
            warn!(path = %file.display(), %error, "could not remove cache entry");
        }
    }
}

fn earlier(time: SystemTime, by: Duration) -> SystemTime {
    time.checked_sub(by).unwrap_or(SystemTime::UNIX_EPOCH)
}

async fn set_modified(path: &Path, time: SystemTime) -> Result<(), DownloadError> {
    let owned = path.to_owned();
    tokio::task::spawn_blocking(move || {
        std::fs::OpenOptions::new()
            .write(true)
            .open(&owned)?
            .set_modified(time)
    })
    .await
    .map_err(io::Error::other)
    .and_then(|result| result)
    .map_err(|e| DownloadError::io(path, e))
}
