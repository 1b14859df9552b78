//! Model configuration, loadable from JSON.
//!
//! ```json
//! {
//!     "dispatcher": { "http_cache": { "dir": "/var/cache/wombat" } },
//!     "font_dir": "/var/cache/wombat-fonts",
//!     "dpi": 120,
//!     "viewport": { "width": 800, "height": 600 }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use wombat_css::MediaEnvironment;
use wombat_net::DispatcherConfig;

/// Why a configuration file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("invalid configuration in {}: {source}", path.display())]
    Json {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Size of the area documents are laid out in, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// Settings of a [`crate::Model`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Download settings.
    pub dispatcher: DispatcherConfig,
    /// Where `@font-face` fonts are installed; `None` keeps them in memory.
    pub font_dir: Option<PathBuf>,
    /// Resolution used for absolute length units.
    pub dpi: f64,
    /// Viewport used for media queries.
    pub viewport: Viewport,
    /// Media type used for media queries.
    pub media_type: String,
    /// Preferred color scheme, `light` or `dark`.
    pub color_scheme: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dispatcher: DispatcherConfig::default(),
            font_dir: None,
            dpi: 96.0,
            viewport: Viewport::default(),
            media_type: "screen".to_owned(),
            color_scheme: "light".to_owned(),
        }
    }
}

impl ModelConfig {
    /// Read a JSON configuration file; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        })
    }

    /// The media environment views start with.
    #[must_use]
    pub fn media_environment(&self) -> MediaEnvironment {
        MediaEnvironment {
            media_type: self.media_type.clone(),
            width: self.viewport.width,
            height: self.viewport.height,
            dpi: self.dpi,
            color_scheme: self.color_scheme.clone(),
        }
    }
}
