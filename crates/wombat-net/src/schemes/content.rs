//! `cid:` and `resource:` URLs, served by the embedding application.

use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::DownloadError;
use crate::{Download, SchemeHandler};

/// MIME type of the empty answer for a `cid:` URL nobody can serve.
pub const NULL_MIME: &str = "application/x-null";

/// Produces content for application-defined URLs.
///
/// Plain functions and closures of type
/// `Fn(&str) -> Result<Download, DownloadError>` implement this trait.
pub trait ContentSource: Send + Sync {
    /// Fetch the content of `url`.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>>;
}

impl<F> ContentSource for F
where
    F: Fn(&str) -> Result<Download, DownloadError> + Send + Sync,
{
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        future::ready(self(url)).boxed()
    }
}

/// Serves `cid:` URLs (content ids of message attachments).
///
/// Without a source every URL yields empty content of type
/// [`NULL_MIME`].
#[derive(Clone, Default)]
pub struct CidHandler {
    source: Option<Arc<dyn ContentSource>>,
}

impl CidHandler {
    /// A handler backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source: Some(source),
        }
    }
}

impl SchemeHandler for CidHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("cid:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        match &self.source {
            Some(source) => source.fetch(url),
            None => future::ready(Ok(Download {
                data: Vec::new(),
                mime: NULL_MIME.to_owned(),
            }))
            .boxed(),
        }
    }
}

/// Serves `resource:` URLs generated by the application.
#[derive(Clone, Default)]
pub struct ResourceHandler {
    source: Option<Arc<dyn ContentSource>>,
}

impl ResourceHandler {
    /// A handler backed by `source`.
    #[must_use]
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self {
            source: Some(source),
        }
    }
}

impl SchemeHandler for ResourceHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("resource:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        match &self.source {
            Some(source) => source.fetch(url),
            None => future::ready(Err(DownloadError::BadResourceUrl(url.to_owned()))).boxed(),
        }
    }
}
