//! Links declared by documents.
//!
//! [`scan_document_links`] lists every resource a document needs before it
//! can be rendered, unresolved and in document order. Inline styles become
//! `data:` URLs so that they load, parse and cache like any other
//! stylesheet.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use wombat_dom::{DomTree, NodeId, ns, pseudo_attributes};
use wombat_net::download_data_url;
use wombat_net::mime::essence;

use crate::document::{CssDocument, Document};

/// Default presentation of HTML elements.
pub const HTML_STYLESHEET: &str = "chrome://html.css";

/// Characters escaped in generated `data:` URLs; alphanumerics and `_.-~/`
/// are kept.
const DATA_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Every link of `document`, including `data:` URLs and the links found
/// inside them.
#[must_use]
pub fn scan_document_links(document: &Document) -> Vec<String> {
    match document {
        Document::Xml(tree) => xml_stylesheets(tree),
        Document::Html(tree) => {
            let mut links = vec![HTML_STYLESHEET.to_owned()];
            links.extend(xml_stylesheets(tree));
            html_links(tree, NodeId::ROOT, &mut links);
            links
        }
        Document::Svg(tree) => {
            let mut links = xml_stylesheets(tree);
            svg_links(tree, NodeId::ROOT, &mut links);
            links
        }
        Document::Css(css) => css.links(),
        _ => Vec::new(),
    }
}

/// Stylesheets that style `document`, in cascade order.
///
/// Inline `style` attributes are not included; they are applied per element.
#[must_use]
pub fn stylesheet_links(document: &Document) -> Vec<String> {
    match document {
        Document::Xml(tree) => xml_stylesheets(tree),
        Document::Html(tree) => {
            let mut links = vec![HTML_STYLESHEET.to_owned()];
            links.extend(xml_stylesheets(tree));
            links.extend(style_elements(tree, NodeId::ROOT, ns::XHTML));
            links.extend(stylesheet_elements(tree, NodeId::ROOT));
            links
        }
        Document::Svg(tree) => {
            let mut links = xml_stylesheets(tree);
            links.extend(style_elements(tree, NodeId::ROOT, ns::SVG));
            links
        }
        _ => Vec::new(),
    }
}

/// The stylesheet of a `style` attribute as a `data:` URL.
#[must_use]
pub fn style_attribute_url(style: &str) -> String {
    data_url("text/css", &format!("* {{{style}}}"))
}

fn data_url(mime: &str, text: &str) -> String {
    format!("data:{mime},{}", utf8_percent_encode(text, DATA_ESCAPE))
}

/// [Associating Style Sheets with XML documents](https://www.w3.org/TR/xml-stylesheet/)
///
/// `href`s of `xml-stylesheet` processing instructions before the root.
fn xml_stylesheets(tree: &DomTree) -> Vec<String> {
    tree.prolog_instructions()
        .filter(|(target, _)| *target == "xml-stylesheet")
        .filter_map(|(_, data)| pseudo_attributes(data).remove("href"))
        .collect()
}

fn html_links(tree: &DomTree, scope: NodeId, links: &mut Vec<String>) {
    with_internal_links(style_attributes(tree, scope), links);
    with_internal_links(style_elements(tree, scope, ns::XHTML), links);
    links.extend(stylesheet_elements(tree, scope));
}

fn svg_links(tree: &DomTree, scope: NodeId, links: &mut Vec<String>) {
    links.extend(svg_hrefs(tree, scope));
    with_internal_links(style_attributes(tree, scope), links);
    with_internal_links(style_elements(tree, scope, ns::SVG), links);
    foreign_objects(tree, scope, links);
}

/// `xlink:href` attributes first, then plain `href`, of SVG elements other
/// than `a`.
fn svg_hrefs(tree: &DomTree, scope: NodeId) -> Vec<String> {
    let linking = || {
        tree.elements(scope)
            .filter_map(|id| tree.as_element(id))
            .filter(|data| data.name.ns.as_deref() == Some(ns::SVG) && data.name.local != "a")
    };
    linking()
        .filter_map(|data| data.attr_ns(Some(ns::XLINK), "href"))
        .chain(linking().filter_map(|data| data.attr_ns(None, "href")))
        .map(str::to_owned)
        .collect()
}

fn style_attributes(tree: &DomTree, scope: NodeId) -> Vec<String> {
    tree.elements(scope)
        .filter_map(|id| tree.as_element(id)?.attr_ns(None, "style"))
        .map(style_attribute_url)
        .collect()
}

/// `<style>` elements of `namespace` as `data:` URLs of their `type`.
fn style_elements(tree: &DomTree, scope: NodeId, namespace: &str) -> Vec<String> {
    tree.elements(scope)
        .filter(|&id| {
            tree.as_element(id)
                .is_some_and(|data| data.name.is(Some(namespace), "style"))
        })
        .map(|id| {
            let mime = tree
                .as_element(id)
                .and_then(|data| data.attr("type"))
                .map_or_else(|| "text/css".to_owned(), str::to_ascii_lowercase);
            data_url(&mime, &tree.text_content(id))
        })
        .collect()
}

/// `<link rel="stylesheet" href>` elements.
fn stylesheet_elements(tree: &DomTree, scope: NodeId) -> Vec<String> {
    tree.elements(scope)
        .filter_map(|id| tree.as_element(id))
        .filter(|data| {
            data.name.is(Some(ns::XHTML), "link")
                && data.attr("rel").is_some_and(|rel| {
                    rel.split_ascii_whitespace()
                        .any(|token| token.eq_ignore_ascii_case("stylesheet"))
                })
        })
        .filter_map(|data| data.attr("href"))
        .map(str::to_owned)
        .collect()
}

/// Links of the document embedded in each `foreignObject`.
fn foreign_objects(tree: &DomTree, scope: NodeId, links: &mut Vec<String>) {
    let hosts: Vec<NodeId> = tree
        .elements(scope)
        .filter(|&id| {
            tree.as_element(id)
                .is_some_and(|data| data.name.is(Some(ns::SVG), "foreignObject"))
        })
        .collect();
    for host in hosts {
        let Some(embedded) = tree.element_children(host).next() else {
            continue;
        };
        match tree.as_element(embedded).and_then(|data| data.name.ns.as_deref()) {
            Some(ns::XHTML) => {
                links.push(HTML_STYLESHEET.to_owned());
                html_links(tree, embedded, links);
            }
            Some(ns::SVG) => svg_links(tree, embedded, links),
            _ => {}
        }
    }
}

/// Append `urls`, each followed by the links of the stylesheet it encodes
/// when it is a `data:` URL.
fn with_internal_links(urls: Vec<String>, links: &mut Vec<String>) {
    for url in urls {
        let internal = if url.starts_with("data:") {
            data_stylesheet_links(&url)
        } else {
            Vec::new()
        };
        links.push(url);
        with_internal_links(internal, links);
    }
}

fn data_stylesheet_links(url: &str) -> Vec<String> {
    match download_data_url(url) {
        Ok(download) if essence(&download.mime) == "text/css" => {
            CssDocument::parse(&String::from_utf8_lossy(&download.data)).links()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_attribute_url_is_escaped() {
        assert_eq!(
            style_attribute_url("color:blue"),
            "data:text/css,%2A%20%7Bcolor%3Ablue%7D"
        );
    }

    #[test]
    fn test_data_stylesheet_links() {
        let url = data_url("text/css", "@import \"a.css\"; p { background: url(b.png) }");
        assert_eq!(data_stylesheet_links(&url), vec!["a.css", "b.png"]);
        assert!(data_stylesheet_links("data:text/plain,url(x)").is_empty());
    }
}
