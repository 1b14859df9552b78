//! Format registry: bytes and a MIME type in, a typed [`Document`] out.
//!
//! The registry holds an ordered chain of [`FormatDecoder`]s. The first
//! decoder that accepts the content builds the document; the others are not
//! consulted, even when that decoder fails.

mod css;
mod font;
mod image;
mod json;
mod markup;
mod plain;

pub use css::CssDecoder;
pub use font::FontDecoder;
pub use image::RasterDecoder;
pub use json::JsonDecoder;
pub use markup::{HtmlDecoder, SvgDecoder, XmlDecoder};
pub use plain::{BinaryDecoder, NullDecoder, TextDecoder};

use tracing::trace;
use wombat_net::mime::essence;

use crate::document::Document;
use crate::error::ModelError;

/// A decoder that can turn downloaded bytes into a [`Document`].
pub trait FormatDecoder: Send + Sync {
    /// Human-readable name (for diagnostics).
    fn name(&self) -> &'static str;

    /// Whether this decoder handles content of this MIME type. `mime` has
    /// no parameters and is lower case.
    fn accepts(&self, data: &[u8], mime: &str) -> bool;

    /// Build the document.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Parse`] when the content is malformed.
    fn decode(&self, data: &[u8], mime: &str) -> Result<Document, ModelError>;

    /// Build the document and report the problems that did not stop it
    /// from being built.
    ///
    /// # Errors
    ///
    /// As for [`FormatDecoder::decode`].
    fn decode_with_issues(
        &self,
        data: &[u8],
        mime: &str,
    ) -> Result<(Document, Vec<String>), ModelError> {
        self.decode(data, mime).map(|document| (document, Vec::new()))
    }
}

/// Ordered chain of format decoders.
pub struct FormatRegistry {
    decoders: Vec<Box<dyn FormatDecoder>>,
}

impl FormatRegistry {
    /// The standard chain: null, HTML, SVG, XML, CSS, JSON, fonts, raster
    /// images, plain text and finally opaque binary data.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoders: vec![
                Box::new(NullDecoder),
                Box::new(HtmlDecoder),
                Box::new(SvgDecoder),
                Box::new(XmlDecoder),
                Box::new(CssDecoder),
                Box::new(JsonDecoder),
                Box::new(FontDecoder),
                Box::new(RasterDecoder),
                Box::new(TextDecoder),
                Box::new(BinaryDecoder),
            ],
        }
    }

    /// Consult `decoder` before all others.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Box<dyn FormatDecoder>) -> Self {
        self.decoders.insert(0, decoder);
        self
    }

    /// Build a document from downloaded content.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnsupportedFormat`] when no decoder accepts the
    /// MIME type, or the decoder's error.
    pub fn create_document(&self, data: &[u8], mime: &str) -> Result<Document, ModelError> {
        self.create_document_with_issues(data, mime)
            .map(|(document, _)| document)
    }

    /// Build a document and collect the decoder's non-fatal issues.
    ///
    /// # Errors
    ///
    /// As for [`FormatRegistry::create_document`].
    pub fn create_document_with_issues(
        &self,
        data: &[u8],
        mime: &str,
    ) -> Result<(Document, Vec<String>), ModelError> {
        let mime = essence(mime);
        let decoder = self
            .decoders
            .iter()
            .find(|decoder| decoder.accepts(data, &mime))
            .ok_or_else(|| ModelError::UnsupportedFormat(mime.clone()))?;
        trace!(decoder = decoder.name(), mime = %mime, bytes = data.len(), "decoding");
        decoder.decode_with_issues(data, &mime)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.decoders.iter().map(|decoder| decoder.name()))
            .finish()
    }
}

/// Decode text as UTF-8, replacing invalid sequences.
fn text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}
