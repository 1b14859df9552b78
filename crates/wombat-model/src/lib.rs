//! Asynchronous document model for wombat.
//!
//! # Scope
//!
//! This crate provides:
//! - **Loader** - [`Model::open_document`] downloads a document and every
//!   document it links to, sharing downloads between documents and views
//! - **Formats** - decoders for HTML, XHTML, SVG, XML, CSS, JSON, fonts,
//!   raster images, text and binary data, tried in registration order
//! - **Events** - the lifecycle events of loading, with handlers able to
//!   prevent, redirect or substitute
//! - **Views** - consumers of the model, each showing at most one document
//! - **Style cascade** - [`Model::get_attribute`] over inline styles,
//!   stylesheets and presentation attributes
//! - **Fonts** - installation of `@font-face` fonts
//! - **SVG path data** - [`parse_path`]
//!
//! # Not Yet Implemented
//!
//! - Rendering and layout
//! - Scripting
//! - `srcset` and `<picture>` source selection

pub mod config;
pub mod document;
mod error;
pub mod events;
pub mod fonts;
pub mod formats;
pub mod links;
mod loader;
pub mod path;
pub mod style;
pub mod view;

pub use config::{ConfigError, ModelConfig, Viewport};
pub use document::{
    BinaryDocument, CssDocument, Document, DocumentKind, FontDocument, FontFormat, RasterImage,
    get_document_fragment,
};
pub use error::ModelError;
pub use events::{Event, EventHandler, EventKind, EventLog, Response};
pub use fonts::{FontDirectory, FontRegistry};
pub use formats::{FormatDecoder, FormatRegistry};
pub use links::{scan_document_links, stylesheet_links};
pub use loader::Model;
pub use path::{FillRule, PathSegment, parse_path};
pub use view::{PseudoClassOracle, View, ViewId};
