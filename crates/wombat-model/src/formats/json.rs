use super::FormatDecoder;
use crate::document::Document;
use crate::error::ModelError;

/// `application/json` and `*/*+json`.
pub struct JsonDecoder;

impl FormatDecoder for JsonDecoder {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        mime == "application/json" || mime.ends_with("+json")
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        serde_json::from_slice(data)
            .map(Document::Json)
            .map_err(|e| ModelError::Parse(e.to_string()))
    }
}
