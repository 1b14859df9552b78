//! Scheme dispatch.

use std::sync::Arc;

use tracing::{debug, trace};
use wombat_common::url_root;

use crate::config::DispatcherConfig;
use crate::error::DownloadError;
use crate::schemes::{
    ChromeHandler, CidHandler, ContentSource, DataHandler, FileHandler, HttpHandler,
    ResourceHandler,
};
use crate::{Download, SchemeHandler};

/// Downloads URLs through an ordered list of scheme handlers.
#[derive(Clone)]
pub struct Dispatcher {
    handlers: Vec<Arc<dyn SchemeHandler>>,
}

impl Dispatcher {
    /// The standard handlers: `data:`, `file:`, `http:`/`https:`,
    /// `chrome:`, `cid:` without a source and `resource:` without a source.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] when the HTTP client cannot be
    /// built.
    pub fn new(config: &DispatcherConfig) -> Result<Self, DownloadError> {
        Ok(Self {
            handlers: vec![
                Arc::new(DataHandler),
                Arc::new(FileHandler),
                Arc::new(HttpHandler::new(config)?),
                Arc::new(ChromeHandler::new(config.chrome_dir.clone())),
                Arc::new(CidHandler::default()),
                Arc::new(ResourceHandler::default()),
            ],
        })
    }

    /// Consult `handler` before all others.
    #[must_use]
    pub fn with_handler(mut self, handler: Arc<dyn SchemeHandler>) -> Self {
        self.handlers.insert(0, handler);
        self
    }

    /// Serve `cid:` URLs from `source`.
    #[must_use]
    pub fn with_cid_source(self, source: Arc<dyn ContentSource>) -> Self {
        self.with_handler(Arc::new(CidHandler::new(source)))
    }

    /// Serve `resource:` URLs from `source`.
    #[must_use]
    pub fn with_resource_source(self, source: Arc<dyn ContentSource>) -> Self {
        self.with_handler(Arc::new(ResourceHandler::new(source)))
    }

    /// Download `url`; its fragment is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::UnsupportedScheme`] when no handler accepts
    /// the URL, or the handler's error.
    pub async fn download(&self, url: &str) -> Result<Download, DownloadError> {
        let url = url_root(url);
        let handler = self
            .handlers
            .iter()
            .find(|handler| handler.accepts(url))
            .ok_or_else(|| DownloadError::UnsupportedScheme(url.to_owned()))?;

        debug!(url = truncated(url), "downloading");
        let download = handler.download(url).await?;
        trace!(
            url = truncated(url),
            mime = %download.mime,
            bytes = download.data.len(),
            "downloaded"
        );
        Ok(download)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// `data:` URLs can be long; log only their head.
fn truncated(url: &str) -> &str {
    match url.char_indices().nth(80) {
        Some((end, _)) => &url[..end],
        None => url,
    }
}
