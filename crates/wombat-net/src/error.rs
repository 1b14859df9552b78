//! Download failures.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Why a URL could not be downloaded.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// No handler accepts the URL's scheme.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    /// The transport failed.
    #[error("network error for {url}: {message}")]
    Network {
        /// URL being fetched.
        url: String,
        /// Transport diagnostic.
        message: String,
    },
    /// The host name could not be resolved.
    #[error("could not resolve host {0}")]
    Resolve(String),
    /// The server answered with a 4xx or 5xx status.
    #[error("HTTP {status} for {url}")]
    Http {
        /// URL being fetched.
        url: String,
        /// Response status code.
        status: u16,
    },
    /// A malformed `data:` URL.
    #[error("malformed data URL: {0}")]
    BadDataUrl(String),
    /// A `resource:` or `chrome:` URL that names nothing.
    #[error("bad resource URL: {0}")]
    BadResourceUrl(String),
    /// A `file:` URL on another host.
    #[error("only local files are supported: {0}")]
    NonLocalFile(String),
    /// `304 Not Modified` arrived but nothing is cached.
    #[error("304 Not Modified without a cached copy of {0}")]
    NotModifiedWithoutCache(String),
    /// Reading a file or cache entry failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl DownloadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether a stale cached copy may be served instead.
    ///
    /// Transport failures and server errors qualify; a 4xx answer does not.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Resolve(_) => true,
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}
