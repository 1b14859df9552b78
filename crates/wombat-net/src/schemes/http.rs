//! `http:` and `https:` URLs through the on-disk cache.

use std::error::Error as _;
use std::sync::Arc;
use std::time::SystemTime;

use futures::future::{BoxFuture, FutureExt};
use headers::{HeaderMapExt, IfModifiedSince};
use http::header::{ACCEPT, CONNECTION, CONTENT_TYPE, HeaderValue};
use http::{HeaderMap, StatusCode};
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

use crate::cache::{CacheEntry, CacheState, HttpCache};
use crate::config::DispatcherConfig;
use crate::error::DownloadError;
use crate::mime::{OCTET_STREAM, essence};
use crate::{Download, SchemeHandler};

/// User-Agent header sent with all requests.
const USER_AGENT: &str = concat!("wombat/", env!("CARGO_PKG_VERSION"));

/// Formats the document model can read, most wanted first.
const ACCEPT_TYPES: &str = "application/xhtml+xml, text/html;q=0.9, image/svg+xml, \
    application/xml;q=0.9, text/css, image/webp, image/png, image/jpeg, \
    font/woff2, font/woff, font/ttf, application/json, */*;q=0.5";

/// Outcome of one request.
enum Fetched {
    Ok(Download, HeaderMap),
    NotModified(HeaderMap),
}

/// Serves `http:` and `https:` URLs.
///
/// Connections are pooled per host. With a cache directory configured,
/// responses are stored and revalidated as described in [`crate::cache`].
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: reqwest::Client,
    cache: Option<HttpCache>,
    limit: Option<Arc<Semaphore>>,
}

impl HttpHandler {
    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] when the TLS backend cannot be
    /// initialised.
    pub fn new(config: &DispatcherConfig) -> Result<Self, DownloadError> {
        let mut default_headers = HeaderMap::new();
        let _ = default_headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_TYPES));
        let _ = default_headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(default_headers)
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .pool_max_idle_per_host(1)
            .build()
            .map_err(|e| DownloadError::Network {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            cache: HttpCache::from_config(&config.http_cache),
            limit: config
                .max_connections
                .map(|permits| Arc::new(Semaphore::new(permits.max(1)))),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Download, DownloadError> {
        let _permit = match &self.limit {
            Some(limit) => Some(limit.acquire().await.map_err(|e| DownloadError::Network {
                url: url.to_owned(),
                message: e.to_string(),
            })?),
            None => None,
        };

        let Some(cache) = &self.cache else {
            return match self.request(url, None).await? {
                Fetched::Ok(download, _) => Ok(download),
                Fetched::NotModified(_) => Err(DownloadError::NotModifiedWithoutCache(url.to_owned())),
            };
        };

        let stale = match cache.lookup(url).await? {
            CacheState::Fresh(entry) => {
                trace!(url, "serving fresh cache entry");
                return entry.read().await;
            }
            CacheState::Stale(entry) => Some(entry),
            CacheState::Missing => None,
        };

        match self.request(url, stale.as_ref().map(|entry| entry.fetched)).await {
            Ok(Fetched::Ok(download, headers)) => {
                if let Err(error) = cache.store(url, &download, &headers).await {
                    warn!(url, %error, "could not cache response");
                }
                Ok(download)
            }
            Ok(Fetched::NotModified(headers)) => {
                let entry = stale.ok_or_else(|| DownloadError::NotModifiedWithoutCache(url.to_owned()))?;
                debug!(url, "not modified, serving cache entry");
                let download = entry.read().await?;
                cache.refresh(&entry, &headers).await?;
                Ok(download)
            }
            Err(error) => serve_stale(url, stale.as_ref(), error).await,
        }
    }

    /// `GET url`, conditional when `since` is given.
    async fn request(&self, url: &str, since: Option<SystemTime>) -> Result<Fetched, DownloadError> {
        let mut headers = HeaderMap::new();
        if let Some(since) = since {
            headers.typed_insert(IfModifiedSince::from(since));
        }

        debug!(url, conditional = since.is_some(), "HTTP request");
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;

        let status = response.status();
        let headers = response.headers().clone();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(Fetched::NotModified(headers));
        }
        if !status.is_success() {
            return Err(DownloadError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let mime = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or_else(|| OCTET_STREAM.to_owned(), essence);
        let data = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, &e))?
            .to_vec();
        Ok(Fetched::Ok(Download { data, mime }, headers))
    }
}

impl SchemeHandler for HttpHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("http:") || url.starts_with("https:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        self.fetch(url).boxed()
    }
}

/// Fall back to a stale entry when the failure is transient.
async fn serve_stale(
    url: &str,
    stale: Option<&CacheEntry>,
    error: DownloadError,
) -> Result<Download, DownloadError> {
    match stale {
        Some(entry) if error.is_transient() => {
            warn!(url, %error, "request failed, serving stale cache entry");
            entry.read().await
        }
        _ => Err(error),
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> DownloadError {
    let mut source = error.source();
    while let Some(cause) = source {
        if cause.to_string().starts_with("dns error") {
            let host = error
                .url()
                .and_then(|url| url.host_str())
                .unwrap_or(url)
                .to_owned();
            return DownloadError::Resolve(host);
        }
        source = cause.source();
    }
    DownloadError::Network {
        url: url.to_owned(),
        message: error.to_string(),
    }
}
