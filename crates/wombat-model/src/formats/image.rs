use super::FormatDecoder;
use crate::document::{Document, RasterImage};
use crate::error::ModelError;

/// Raster image MIME types the `image` crate is built to decode.
const RASTER_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/bmp"];

/// Decodes raster images (PNG, JPEG, WebP, BMP) via the `image` crate.
pub struct RasterDecoder;

impl FormatDecoder for RasterDecoder {
    fn name(&self) -> &'static str {
        "raster (image crate)"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        RASTER_TYPES.contains(&mime)
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        let decoded = image::load_from_memory(data)
            .map_err(|e| ModelError::Parse(format!("could not decode image ({e})")))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Document::RasterImage(RasterImage {
            width,
            height,
            pixels: rgba.into_raw(),
        }))
    }
}
