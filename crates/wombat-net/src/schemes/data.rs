//! [RFC 2397](https://www.rfc-editor.org/rfc/rfc2397) `data:` URLs.

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use futures::future::{self, BoxFuture, FutureExt};
use percent_encoding::{percent_decode, percent_decode_str};

use crate::error::DownloadError;
use crate::mime::OCTET_STREAM;
use crate::{Download, SchemeHandler};

/// A parsed `data:` URL.
///
/// "dataurl := "data:" [ mediatype ] [ ";base64" ] "," data"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type, `application/octet-stream` when omitted.
    pub mime: String,
    /// Value of the `charset` parameter, if any.
    pub charset: Option<String>,
    /// Whether the payload is base64.
    pub base64: bool,
    /// Payload, still encoded.
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Split a `data:` URL into its header fields and payload.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::BadDataUrl`] when the scheme or the comma
    /// before the payload is missing.
    pub fn parse(url: &'a str) -> Result<Self, DownloadError> {
        let bad = || DownloadError::BadDataUrl(url.to_owned());
        let rest = url.strip_prefix("data:").ok_or_else(bad)?;
        let (header, payload) = rest.split_once(',').ok_or_else(bad)?;

        let mut parameters = header.split(';');
        let mime = parameters
            .next()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(OCTET_STREAM)
            .to_ascii_lowercase();

        let mut charset = None;
        let mut base64 = false;
        for parameter in parameters {
            let parameter = parameter.trim();
            if parameter.eq_ignore_ascii_case("base64") {
                base64 = true;
            } else if let Some(value) = parameter.strip_prefix("charset=") {
                charset = Some(value.to_owned());
            }
        }

        Ok(Self {
            mime,
            charset,
            base64,
            payload,
        })
    }

    /// Decode the payload.
    ///
    /// Percent escapes are always decoded to the octets they name. In a
    /// single-byte charset, literal characters of the payload are encoded
    /// into that charset first.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::BadDataUrl`] for invalid base64.
    pub fn decode(&self) -> Result<Vec<u8>, DownloadError> {
        if !self.base64 && self.is_single_byte() {
            let raw: Vec<u8> = self
                .payload
                .chars()
                .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
                .collect();
            return Ok(percent_decode(&raw).collect());
        }

        let bytes: Vec<u8> = percent_decode_str(self.payload).collect();
        if self.base64 {
            let text: Vec<u8> = bytes
                .into_iter()
                .filter(|b| !b.is_ascii_whitespace() && *b != b'=')
                .collect();
            return STANDARD_NO_PAD
                .decode(text)
                .map_err(|e| DownloadError::BadDataUrl(format!("{}: {e}", self.payload)));
        }

        Ok(bytes)
    }

    fn is_single_byte(&self) -> bool {
        self.charset.as_deref().is_some_and(|charset| {
            ["iso-8859-1", "latin1", "us-ascii", "ascii"]
                .iter()
                .any(|name| charset.eq_ignore_ascii_case(name))
        })
    }
}

/// Serves `data:` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataHandler;

impl SchemeHandler for DataHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("data:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        future::ready(download_data_url(url)).boxed()
    }
}

/// Decode a `data:` URL into bytes and MIME type.
///
/// # Errors
///
/// Returns [`DownloadError::BadDataUrl`] for a malformed URL or payload.
pub fn download_data_url(url: &str) -> Result<Download, DownloadError> {
    let data_url = DataUrl::parse(url)?;
    Ok(Download {
        data: data_url.decode()?,
        mime: data_url.mime,
    })
}
