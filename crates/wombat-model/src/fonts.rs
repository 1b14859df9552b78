//! Installation of `@font-face` fonts.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::PathBuf;

use futures::future::{BoxFuture, FutureExt};
use sha3::{Digest, Sha3_256};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::document::FontDocument;
use crate::error::ModelError;

/// Makes downloaded fonts available to text rendering.
pub trait FontRegistry: Send + Sync {
    /// Make `font`, downloaded from `url`, available as `family`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Font`] when the font cannot be stored.
    fn install_font<'a>(
        &'a self,
        font: &'a FontDocument,
        family: &'a str,
        url: &'a str,
    ) -> BoxFuture<'a, Result<(), ModelError>>;

    /// Forget every installed font.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Font`] when the registry cannot be updated.
    fn uninstall_fonts(&self) -> BoxFuture<'_, Result<(), ModelError>>;

    /// Whether a font is installed as `family`.
    fn is_font_installed<'a>(&'a self, family: &'a str) -> BoxFuture<'a, bool>;
}

/// Fonts saved to a directory, one file per family and source URL.
///
/// Files are named `{hash}.{format}` where `hash` is the first 16 hex digits
/// of the SHA3-256 of `family@url`; an existing file is reused. Without a
/// directory, fonts are only registered by family name.
#[derive(Debug, Default)]
pub struct FontDirectory {
    dir: Option<PathBuf>,
    installed: Mutex<BTreeMap<String, Option<PathBuf>>>,
}

impl FontDirectory {
    /// A registry writing into `dir`.
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            installed: Mutex::new(BTreeMap::new()),
        }
    }

    /// Installed families with their files.
    pub async fn installed(&self) -> Vec<(String, Option<PathBuf>)> {
        self.installed
            .lock()
            .await
            .iter()
            .map(|(family, path)| (family.clone(), path.clone()))
            .collect()
    }

    async fn install(&self, font: &FontDocument, family: &str, url: &str) -> Result<(), ModelError> {
        let family = family.replace(':', "_");
        let mut installed = self.installed.lock().await;

        let path = match &self.dir {
            Some(dir) => {
                let path = dir.join(format!("{}.{}", file_stem(&family, url), font.format));
                if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
                    tokio::fs::create_dir_all(dir)
                        .await
                        .map_err(|e| ModelError::Font(format!("{}: {e}", dir.display())))?;
                    tokio::fs::write(&path, &font.data)
                        .await
                        .map_err(|e| ModelError::Font(format!("{}: {e}", path.display())))?;
                    debug!(family = %family, url, path = %path.display(), "font written");
                }
                Some(path)
            }
            None => None,
        };

        trace!(family = %family, "font installed");
        let _ = installed.insert(family, path);
        Ok(())
    }
}

impl FontRegistry for FontDirectory {
    fn install_font<'a>(
        &'a self,
        font: &'a FontDocument,
        family: &'a str,
        url: &'a str,
    ) -> BoxFuture<'a, Result<(), ModelError>> {
        self.install(font, family, url).boxed()
    }

    fn uninstall_fonts(&self) -> BoxFuture<'_, Result<(), ModelError>> {
        async move {
            self.installed.lock().await.clear();
            Ok(())
        }
        .boxed()
    }

    fn is_font_installed<'a>(&'a self, family: &'a str) -> BoxFuture<'a, bool> {
        async move {
            self.installed
                .lock()
                .await
                .contains_key(&family.replace(':', "_"))
        }
        .boxed()
    }
}

fn file_stem(family: &str, url: &str) -> String {
    Sha3_256::digest(format!("{family}@{url}").as_bytes())
        .iter()
        .take(8)
        .fold(String::with_capacity(16), |mut stem, byte| {
            let _ = write!(stem, "{byte:02x}");
            stem
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FontFormat;

    fn font() -> FontDocument {
        FontDocument {
            format: FontFormat::Woff2,
            data: b"wOF2 not really a font".to_vec(),
        }
    }

    #[tokio::test]
    async fn test_install_writes_hashed_file() {
        let dir = tempfile::tempdir().unwrap();
        let fonts = FontDirectory::new(Some(dir.path().to_owned()));
        fonts
            .install_font(&font(), "Open:Sans", "http://h/open.woff2")
            .await
            .unwrap();

        assert!(fonts.is_font_installed("Open_Sans").await);
        assert!(fonts.is_font_installed("Open:Sans").await);
        let installed = fonts.installed().await;
        let path = installed[0].1.clone().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert_eq!(name.len(), 16 + ".woff2".len());
        assert!(name.ends_with(".woff2"));
        assert_eq!(std::fs::read(&path).unwrap(), font().data);
    }

    #[tokio::test]
    async fn test_uninstall_forgets_families() {
        let fonts = FontDirectory::new(None);
        fonts.install_font(&font(), "Serif", "data:,").await.unwrap();
        assert!(fonts.is_font_installed("Serif").await);
        fonts.uninstall_fonts().await.unwrap();
        assert!(!fonts.is_font_installed("Serif").await);
    }

    #[test]
    fn test_file_stem_depends_on_family_and_url() {
        assert_eq!(file_stem("A", "u").len(), 16);
        assert_ne!(file_stem("A", "u"), file_stem("B", "u"));
        assert_ne!(file_stem("A", "u"), file_stem("A", "v"));
    }
}
