//! URL downloads for the wombat document model.
//!
//! # Scope
//!
//! This crate provides:
//! - **Dispatcher** - picks the scheme handler for a URL
//! - **Scheme handlers** - `data:`, `file:`, `http:`/`https:`, `chrome:`,
//!   `cid:` and `resource:`
//! - **HTTP cache** - on-disk response cache with revalidation
//!
//! # Not Yet Implemented
//!
//! - Cookies and authentication
//! - `Vary` and `ETag` based revalidation

pub mod cache;
pub mod config;
pub mod dispatcher;
mod error;
pub mod mime;
pub mod schemes;

pub use cache::{CacheEntry, CacheState, HttpCache};
pub use config::{DispatcherConfig, HttpCacheConfig};
pub use dispatcher::Dispatcher;
pub use error::DownloadError;
pub use schemes::{
    ChromeHandler, CidHandler, ContentSource, DataHandler, DataUrl, FileHandler, HttpHandler,
    NULL_MIME, ResourceHandler, download_data_url, file_url_to_path,
};

use futures::future::BoxFuture;

/// Downloaded content and its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    /// Raw bytes.
    pub data: Vec<u8>,
    /// MIME type without parameters.
    pub mime: String,
}

impl Download {
    /// Content of the given type.
    #[must_use]
    pub fn new(data: impl Into<Vec<u8>>, mime: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime: mime.into(),
        }
    }
}

/// Fetches the URLs of one scheme.
///
/// The [`Dispatcher`] asks each handler in turn whether it
/// [accepts](SchemeHandler::accepts) a URL and downloads through the first
/// one that does.
pub trait SchemeHandler: Send + Sync {
    /// Whether this handler serves `url`.
    fn accepts(&self, url: &str) -> bool;

    /// Fetch `url`, which this handler accepts.
    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>>;
}
