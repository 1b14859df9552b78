//! Errors of the document model.

use wombat_net::DownloadError;
use wombat_xml::ParseError;

/// Why a model operation failed.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No document is loaded for the URL.
    #[error("no document found for `{0}`; perhaps a download link is missing")]
    DocumentNotFound(String),
    /// The document has no element with this id.
    #[error("fragment not found: #{0}")]
    FragmentNotFound(String),
    /// No format handler accepts the MIME type.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    /// The document is malformed.
    #[error("parse error: {0}")]
    Parse(String),
    /// The document could not be downloaded.
    #[error(transparent)]
    Download(#[from] DownloadError),
    /// The open was cancelled.
    #[error("document open cancelled")]
    Cancelled,
    /// The view already shows a document.
    #[error("close the previous document first")]
    AlreadyOpen,
    /// The view shows no document.
    #[error("no document is open")]
    NotOpen,
    /// A font could not be installed.
    #[error("font error: {0}")]
    Font(String),
}

impl ModelError {
    /// Whether the loader turns this error into a warning and a null
    /// document instead of propagating it.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Download(_)
                | Self::UnsupportedFormat(_)
                | Self::Parse(_)
                | Self::DocumentNotFound(_)
                | Self::FragmentNotFound(_)
                | Self::Font(_)
        )
    }
}

impl From<ParseError> for ModelError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error.to_string())
    }
}
