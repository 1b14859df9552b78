//! Typed documents produced by the format registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use strum_macros::{AsRefStr, Display};
use tracing::debug;
use wombat_css::{CompiledMatcher, Stylesheet, scan_links};
use wombat_dom::{DomTree, NodeId};

use crate::error::ModelError;

/// What kind of [`Document`] a URL produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum DocumentKind {
    /// Placeholder for content that failed or was empty.
    Null,
    /// Opaque binary data.
    Bytes,
    /// Plain text.
    Text,
    /// Generic XML.
    Xml,
    /// HTML or XHTML.
    Html,
    /// SVG image.
    Svg,
    /// CSS stylesheet.
    Css,
    /// JSON value.
    Json,
    /// Font file.
    Font,
    /// Decoded raster image.
    RasterImage,
}

/// A loaded document.
///
/// Documents are shared as `Arc<Document>`; two views that open the same URL
/// hold the same allocation.
#[derive(Debug)]
pub enum Document {
    /// Nothing usable was downloaded.
    Null,
    /// Binary data with its MIME type.
    Bytes(BinaryDocument),
    /// Plain text.
    Text(String),
    /// An XML tree in no particular vocabulary.
    Xml(DomTree),
    /// An HTML tree with elements in the XHTML namespace.
    Html(DomTree),
    /// An SVG tree.
    Svg(DomTree),
    /// A stylesheet.
    Css(CssDocument),
    /// A JSON value.
    Json(serde_json::Value),
    /// A font file.
    Font(FontDocument),
    /// Pixels of a decoded raster image.
    RasterImage(RasterImage),
}

impl Document {
    /// Kind of this document.
    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        match self {
            Self::Null => DocumentKind::Null,
            Self::Bytes(_) => DocumentKind::Bytes,
            Self::Text(_) => DocumentKind::Text,
            Self::Xml(_) => DocumentKind::Xml,
            Self::Html(_) => DocumentKind::Html,
            Self::Svg(_) => DocumentKind::Svg,
            Self::Css(_) => DocumentKind::Css,
            Self::Json(_) => DocumentKind::Json,
            Self::Font(_) => DocumentKind::Font,
            Self::RasterImage(_) => DocumentKind::RasterImage,
        }
    }

    /// Element tree of XML, HTML and SVG documents.
    #[must_use]
    pub const fn tree(&self) -> Option<&DomTree> {
        match self {
            Self::Xml(tree) | Self::Html(tree) | Self::Svg(tree) => Some(tree),
            _ => None,
        }
    }

    /// The stylesheet of a CSS document.
    #[must_use]
    pub const fn as_css(&self) -> Option<&CssDocument> {
        match self {
            Self::Css(css) => Some(css),
            _ => None,
        }
    }

    /// The font of a font document.
    #[must_use]
    pub const fn as_font(&self) -> Option<&FontDocument> {
        match self {
            Self::Font(font) => Some(font),
            _ => None,
        }
    }

    /// Namespace of the document element, used to qualify type selectors.
    #[must_use]
    pub fn default_namespace(&self) -> Option<&str> {
        let tree = self.tree()?;
        let root = tree.document_element()?;
        tree.as_element(root)?.name.ns.as_deref()
    }
}

/// [§ 4.5 getElementById](https://dom.spec.whatwg.org/#dom-nonelementparentnode-getelementbyid)
///
/// The first element of `document` whose `id` (or `xml:id`) is `id`.
///
/// # Errors
///
/// Returns [`ModelError::FragmentNotFound`] when there is no such element or
/// the document has no element tree.
pub fn get_document_fragment(document: &Document, id: &str) -> Result<NodeId, ModelError> {
    document
        .tree()
        .and_then(|tree| tree.element_by_id(id))
        .ok_or_else(|| ModelError::FragmentNotFound(id.to_owned()))
}

/// Binary content the model does not interpret.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryDocument {
    /// Raw bytes.
    pub data: Vec<u8>,
    /// Declared MIME type.
    pub mime: String,
}

impl fmt::Debug for BinaryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryDocument")
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A parsed stylesheet with matchers compiled on demand.
///
/// The same stylesheet can style documents in different namespaces, so one
/// matcher is kept per default namespace.
#[derive(Debug)]
pub struct CssDocument {
    /// The parsed stylesheet.
    pub stylesheet: Stylesheet,
    matchers: Mutex<HashMap<Option<String>, Arc<CompiledMatcher>>>,
}

impl CssDocument {
    /// Wrap a parsed stylesheet.
    #[must_use]
    pub fn new(stylesheet: Stylesheet) -> Self {
        Self {
            stylesheet,
            matchers: Mutex::new(HashMap::new()),
        }
    }

    /// Parse stylesheet text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::new(Stylesheet::parse(text))
    }

    /// Matcher with type selectors qualified by `default_ns`.
    pub fn matcher(&self, default_ns: Option<&str>) -> Arc<CompiledMatcher> {
        self.compile(default_ns).0
    }

    /// Selectors the matcher does not understand; they never match.
    ///
    /// Compiles and keeps the matcher for documents without a default
    /// namespace. Empty when that matcher was compiled before.
    #[must_use]
    pub fn selector_warnings(&self) -> Vec<String> {
        self.compile(None).1
    }

    /// The cached matcher for `default_ns`, with the warnings of compiling
    /// it when this call did.
    fn compile(&self, default_ns: Option<&str>) -> (Arc<CompiledMatcher>, Vec<String>) {
        let key = default_ns.map(str::to_owned);
        let mut matchers = self.matchers.lock();
        if let Some(matcher) = matchers.get(&key) {
            return (Arc::clone(matcher), Vec::new());
        }
        let (matcher, warnings) = CompiledMatcher::compile(&self.stylesheet.root, default_ns);
        for warning in &warnings {
            debug!(%warning, "selector not understood");
        }
        let matcher = Arc::new(matcher);
        let _ = matchers.insert(key, Arc::clone(&matcher));
        (matcher, warnings)
    }

    /// Resources the stylesheet refers to.
    #[must_use]
    pub fn links(&self) -> Vec<String> {
        scan_links(&self.stylesheet.root)
    }
}

/// Container format of a font file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum FontFormat {
    /// TrueType (`sfnt` version 1.0 or `true`).
    Ttf,
    /// OpenType with CFF outlines.
    Otf,
    /// WOFF 1.0.
    Woff,
    /// WOFF 2.0.
    Woff2,
}

impl FontFormat {
    /// Format named by a MIME type, including the legacy `application/...`
    /// aliases.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "font/ttf" | "font/sfnt" | "application/font-sfnt" | "application/x-font-sfnt"
            | "application/font-ttf" | "application/x-font-ttf" | "application/x-font-truetype" => {
                Some(Self::Ttf)
            }
            "font/otf" | "application/font-otf" | "application/x-font-otf"
            | "application/x-font-opentype" => Some(Self::Otf),
            "font/woff" | "application/font-woff" | "application/x-font-woff" => Some(Self::Woff),
            "font/woff2" | "application/font-woff2" => Some(Self::Woff2),
            _ => None,
        }
    }

    /// Format recognized from the file signature.
    #[must_use]
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data.get(..4)? {
            [0, 1, 0, 0] | b"true" => Some(Self::Ttf),
            b"OTTO" => Some(Self::Otf),
            b"wOFF" => Some(Self::Woff),
            b"wOF2" => Some(Self::Woff2),
            _ => None,
        }
    }
}

/// A font file.
#[derive(Clone, PartialEq, Eq)]
pub struct FontDocument {
    /// Container format; also the file extension when installed.
    pub format: FontFormat,
    /// File contents.
    pub data: Vec<u8>,
}

impl FontDocument {
    /// Family name from the `name` table.
    ///
    /// The typographic family is preferred over the legacy family name.
    /// WOFF files are compressed and report no family.
    #[must_use]
    pub fn family(&self) -> Option<String> {
        if !matches!(self.format, FontFormat::Ttf | FontFormat::Otf) {
            return None;
        }
        let face = ttf_parser::Face::parse(&self.data, 0).ok()?;
        let names = face.names();
        [
            ttf_parser::name_id::TYPOGRAPHIC_FAMILY,
            ttf_parser::name_id::FAMILY,
        ]
        .into_iter()
        .find_map(|wanted| {
            names
                .into_iter()
                .filter(|name| name.name_id == wanted && name.is_unicode())
                .find_map(|name| name.to_string())
        })
    }
}

impl fmt::Debug for FontDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontDocument")
            .field("format", &self.format)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A decoded raster image in RGBA8.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8 pixel data, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_format_detection() {
        assert_eq!(FontFormat::from_mime("font/woff2"), Some(FontFormat::Woff2));
        assert_eq!(
            FontFormat::from_mime("application/x-font-ttf"),
            Some(FontFormat::Ttf)
        );
        assert_eq!(FontFormat::from_mime("text/css"), None);
        assert_eq!(FontFormat::sniff(b"OTTO\0\0"), Some(FontFormat::Otf));
        assert_eq!(FontFormat::sniff(b"wOFF"), Some(FontFormat::Woff));
        assert_eq!(FontFormat::sniff(b"ab"), None);
        assert_eq!(FontFormat::Woff2.to_string(), "woff2");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(DocumentKind::RasterImage.to_string(), "raster-image");
        assert_eq!(Document::Null.kind(), DocumentKind::Null);
    }

    #[test]
    fn test_matchers_are_cached_per_namespace() {
        let css = CssDocument::parse("a { color: red }");
        let first = css.matcher(None);
        let second = css.matcher(None);
        assert!(Arc::ptr_eq(&first, &second));
        let html = css.matcher(Some(wombat_dom::ns::XHTML));
        assert!(!Arc::ptr_eq(&first, &html));
    }
}
