//! `file:` URLs.

use std::path::{Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use percent_encoding::percent_decode_str;
use tracing::debug;

use crate::error::DownloadError;
use crate::mime::{OCTET_STREAM, mime_for_extension};
use crate::{Download, SchemeHandler};

/// Serves `file:` URLs from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHandler;

impl SchemeHandler for FileHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("file:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        async move {
            let path = file_url_to_path(url)?;
            read_file(&path).await
        }
        .boxed()
    }
}

/// Path named by a `file:` URL.
///
/// Accepted forms are `file:///abs`, `file://localhost/abs`, `file:/abs`,
/// and `file://./rel` or `file:rel` for paths relative to the working
/// directory. Percent escapes are decoded.
///
/// # Errors
///
/// Returns [`DownloadError::NonLocalFile`] when the URL names another host.
pub fn file_url_to_path(url: &str) -> Result<PathBuf, DownloadError> {
    let rest = url
        .strip_prefix("file:")
        .ok_or_else(|| DownloadError::UnsupportedScheme(url.to_owned()))?;

    let path = if let Some(authority) = rest.strip_prefix("//") {
        let (host, path) = authority.split_once('/').unwrap_or((authority, ""));
        match host {
            "" | "localhost" => format!("/{path}"),
            "." => path.to_owned(),
            _ => return Err(DownloadError::NonLocalFile(url.to_owned())),
        }
    } else {
        rest.to_owned()
    };

    Ok(PathBuf::from(
        percent_decode_str(&path).decode_utf8_lossy().into_owned(),
    ))
}

/// Read a file, guessing its MIME type from the extension.
pub(crate) async fn read_file(path: &Path) -> Result<Download, DownloadError> {
    debug!(path = %path.display(), "reading file");
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    let mime = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map_or_else(|| OCTET_STREAM.to_owned(), mime_for_extension);
    Ok(Download { data, mime })
}
