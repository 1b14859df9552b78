use wombat_net::mime::OCTET_STREAM;

use super::FormatDecoder;
use crate::document::{Document, FontDocument, FontFormat};
use crate::error::ModelError;

/// Font files, by MIME type or, for untyped data, by signature.
pub struct FontDecoder;

impl FontDecoder {
    fn format(data: &[u8], mime: &str) -> Option<FontFormat> {
        FontFormat::from_mime(mime).or_else(|| {
            if mime == OCTET_STREAM {
                FontFormat::sniff(data)
            } else {
                None
            }
        })
    }
}

impl FormatDecoder for FontDecoder {
    fn name(&self) -> &'static str {
        "font"
    }

    fn accepts(&self, data: &[u8], mime: &str) -> bool {
        Self::format(data, mime).is_some()
    }

    fn decode(&self, data: &[u8], mime: &str) -> Result<Document, ModelError> {
        let format = Self::format(data, mime)
            .ok_or_else(|| ModelError::UnsupportedFormat(mime.to_owned()))?;
        Ok(Document::Font(FontDocument {
            format,
            data: data.to_vec(),
        }))
    }
}
