//! HTML, SVG and generic XML.

use tracing::debug;
use wombat_dom::{DomTree, ns};
use wombat_xml::{parse_html, parse_xml};

use super::{FormatDecoder, text};
use crate::document::Document;
use crate::error::ModelError;

/// Namespace of the document element, if it has one.
fn root_namespace(tree: &DomTree) -> Option<&str> {
    let root = tree.document_element()?;
    tree.as_element(root)?.name.ns.as_deref()
}

/// `text/html` (tag soup) and `application/xhtml+xml` (well-formed).
///
/// Elements the source left without a namespace are put in the XHTML
/// namespace.
pub struct HtmlDecoder;

impl FormatDecoder for HtmlDecoder {
    fn name(&self) -> &'static str {
        "HTML"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        matches!(mime, "text/html" | "application/xhtml+xml")
    }

    fn decode(&self, data: &[u8], mime: &str) -> Result<Document, ModelError> {
        self.decode_with_issues(data, mime).map(|(document, _)| document)
    }

    /// Tag soup problems are reported, not fatal.
    fn decode_with_issues(
        &self,
        data: &[u8],
        mime: &str,
    ) -> Result<(Document, Vec<String>), ModelError> {
        let source = text(data);
        let (mut tree, issues) = if mime == "text/html" {
            let (tree, issues) = parse_html(&source);
            let issues: Vec<String> = issues
                .into_iter()
                .map(|issue| {
                    debug!(line = issue.line, message = %issue.message, "HTML parse issue");
                    format!("{} (line {})", issue.message, issue.line)
                })
                .collect();
            (tree, issues)
        } else {
            (parse_xml(&source)?, Vec::new())
        };
        if tree.document_element().is_none() {
            return Err(ModelError::Parse("document has no root element".to_owned()));
        }
        tree.apply_default_namespace(ns::XHTML);
        Ok((Document::Html(tree), issues))
    }
}

/// `image/svg+xml`.
pub struct SvgDecoder;

impl FormatDecoder for SvgDecoder {
    fn name(&self) -> &'static str {
        "SVG"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        matches!(mime, "image/svg+xml" | "image/svg")
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        let mut tree = parse_xml(&text(data))?;
        let namespace = root_namespace(&tree).map(str::to_owned);
        match namespace.as_deref() {
            Some(ns::SVG) => {}
            None if tree.document_element().is_some() => tree.apply_default_namespace(ns::SVG),
            _ => return Err(ModelError::Parse("not an SVG document".to_owned())),
        }
        Ok(Document::Svg(tree))
    }
}

/// `text/xml`, `application/xml` and `*/*+xml`.
///
/// XHTML and SVG content served under a generic XML type is recognized by
/// the namespace of its root element.
pub struct XmlDecoder;

impl FormatDecoder for XmlDecoder {
    fn name(&self) -> &'static str {
        "XML"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        matches!(mime, "text/xml" | "application/xml") || mime.ends_with("+xml")
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        let tree = parse_xml(&text(data))?;
        Ok(match root_namespace(&tree) {
            Some(ns::XHTML) => Document::Html(tree),
            Some(ns::SVG) => Document::Svg(tree),
            _ => Document::Xml(tree),
        })
    }
}
