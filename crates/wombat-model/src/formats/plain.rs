use wombat_net::NULL_MIME;
use wombat_net::mime::OCTET_STREAM;

use super::{FormatDecoder, text};
use crate::document::{BinaryDocument, Document};
use crate::error::ModelError;

/// `application/x-null`: the answer for content nobody could serve.
pub struct NullDecoder;

impl FormatDecoder for NullDecoder {
    fn name(&self) -> &'static str {
        "null"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        mime == NULL_MIME
    }

    fn decode(&self, _data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        Ok(Document::Null)
    }
}

/// `text/plain`.
pub struct TextDecoder;

impl FormatDecoder for TextDecoder {
    fn name(&self) -> &'static str {
        "text"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        mime == "text/plain"
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        Ok(Document::Text(text(data)))
    }
}

/// `application/octet-stream` that no other decoder recognized.
pub struct BinaryDecoder;

impl FormatDecoder for BinaryDecoder {
    fn name(&self) -> &'static str {
        "binary"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        mime == OCTET_STREAM
    }

    fn decode(&self, data: &[u8], mime: &str) -> Result<Document, ModelError> {
        Ok(Document::Bytes(BinaryDocument {
            data: data.to_vec(),
            mime: mime.to_owned(),
        }))
    }
}
