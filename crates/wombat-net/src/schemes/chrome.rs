//! `chrome:` URLs: resources shipped with the application.

use std::path::{Component, Path, PathBuf};

use futures::future::{BoxFuture, FutureExt};
use tracing::trace;

use crate::error::DownloadError;
use crate::mime::mime_for_extension;
use crate::schemes::read_file;
use crate::{Download, SchemeHandler};

/// Resources compiled into the binary, by path.
const BUILTIN: &[(&str, &str)] = &[("html.css", include_str!("../../resources/html.css"))];

/// Serves `chrome://path` from a resource directory, falling back to the
/// built-in resources.
#[derive(Debug, Clone, Default)]
pub struct ChromeHandler {
    dir: Option<PathBuf>,
}

impl ChromeHandler {
    /// A handler that looks in `dir` first.
    #[must_use]
    pub const fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }
}

impl SchemeHandler for ChromeHandler {
    fn accepts(&self, url: &str) -> bool {
        url.starts_with("chrome:")
    }

    fn download<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Download, DownloadError>> {
        async move {
            let name = chrome_path(url)?;

            if let Some(dir) = &self.dir {
                let path = dir.join(name);
                if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    return read_file(&path).await;
                }
            }

            let (_, text) = BUILTIN
                .iter()
                .find(|(builtin, _)| *builtin == name)
                .ok_or_else(|| DownloadError::BadResourceUrl(url.to_owned()))?;
            trace!(url, "serving built-in resource");
            let mime = Path::new(name)
                .extension()
                .and_then(|extension| extension.to_str())
                .map(mime_for_extension)
                .unwrap_or_default();
            Ok(Download {
                data: text.as_bytes().to_vec(),
                mime,
            })
        }
        .boxed()
    }
}

/// The relative resource path of a `chrome:` URL.
///
/// Paths that could leave the resource directory are rejected.
fn chrome_path(url: &str) -> Result<&str, DownloadError> {
    let rest = url
        .strip_prefix("chrome://")
        .or_else(|| url.strip_prefix("chrome:"))
        .ok_or_else(|| DownloadError::UnsupportedScheme(url.to_owned()))?;
    let inside = !rest.is_empty()
        && Path::new(rest)
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if inside {
        Ok(rest)
    } else {
        Err(DownloadError::BadResourceUrl(url.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_path() {
        assert_eq!(chrome_path("chrome://html.css").unwrap(), "html.css");
        assert_eq!(chrome_path("chrome:icons/a.svg").unwrap(), "icons/a.svg");
        assert!(chrome_path("chrome://../etc/passwd").is_err());
        assert!(chrome_path("chrome:///etc/passwd").is_err());
        assert!(chrome_path("chrome://").is_err());
    }
}
