//! Resources a stylesheet refers to.

use crate::ast::{Node, NodeKind};
use crate::value::{Declaration, Value};

/// One `src` entry of an `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    /// Font file URL, unresolved.
    pub url: String,
    /// Value of the `format()` hint, if any.
    pub format: Option<String>,
}

/// [CSS Fonts § 4 Font Resources](https://www.w3.org/TR/css-fonts-4/#font-resources)
///
/// An `@font-face` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontFace {
    /// `font-family` with quotes removed.
    pub family: String,
    /// `font-weight`, if declared.
    pub weight: Option<String>,
    /// `font-style`, if declared.
    pub style: Option<String>,
    /// `src` entries that name a URL, in order of preference.
    pub sources: Vec<FontSource>,
}

/// Targets of `@import` rules, in order.
#[must_use]
pub fn scan_imports(root: &Node) -> Vec<String> {
    root.nodes_of(NodeKind::AtruleSimple)
        .filter(|rule| rule.text(0) == Some("import"))
        .filter_map(|rule| {
            let target = rule.node(1)?.nodes().next()?;
            match Value::from_node(target) {
                Value::Url(url) => Some(url),
                Value::Str(text) => Some(unquote(&text).to_owned()),
                _ => None,
            }
        })
        .collect()
}

/// `url()` values of style rules, including those nested in at-rule blocks.
#[must_use]
pub fn scan_urls(root: &Node) -> Vec<String> {
    let mut urls = Vec::new();
    collect_style_urls(root, &mut urls);
    urls
}

fn collect_style_urls(block: &Node, urls: &mut Vec<String>) {
    for statement in block.nodes() {
        match statement.kind {
            NodeKind::Style => {
                if let Some(rules) = statement.node(1) {
                    rules.walk(&mut |node| {
                        if node.kind == NodeKind::Url
                            && let Some(url) = node.text(0)
                        {
                            urls.push(url.to_owned());
                        }
                    });
                }
            }
            NodeKind::AtruleBlock => {
                if let Some(scope) = statement.node(2) {
                    collect_style_urls(scope, urls);
                }
            }
            _ => {}
        }
    }
}

/// URLs of every `@font-face` source.
#[must_use]
pub fn scan_fonts(root: &Node) -> Vec<String> {
    scan_font_faces(root)
        .into_iter()
        .flat_map(|face| face.sources)
        .map(|source| source.url)
        .collect()
}

/// Every `@font-face` rule that declares a family.
#[must_use]
pub fn scan_font_faces(root: &Node) -> Vec<FontFace> {
    let mut faces = Vec::new();
    root.walk(&mut |node| {
        if node.kind != NodeKind::AtruleStyle || node.text(0) != Some("font-face") {
            return;
        }
        let Some(rules) = node.node(2) else {
            return;
        };

        let mut family = None;
        let mut weight = None;
        let mut style = None;
        let mut sources = Vec::new();
        for declaration in Declaration::from_rules(rules) {
            match declaration.name.as_str() {
                "font-family" => family = Some(unquote(&declaration.value.to_string()).to_owned()),
                "font-weight" => weight = Some(declaration.value.to_string()),
                "font-style" => style = Some(declaration.value.to_string()),
                "src" => sources = font_sources(&declaration.value),
                _ => {}
            }
        }
        if let Some(family) = family {
            faces.push(FontFace {
                family,
                weight,
                style,
                sources,
            });
        }
    });
    faces
}

/// Entries of a `src` value: `url(...) format(...)`, comma separated.
fn font_sources(value: &Value) -> Vec<FontSource> {
    let entries = match value {
        Value::List(entries) => entries.as_slice(),
        single => std::slice::from_ref(single),
    };
    entries
        .iter()
        .filter_map(|entry| {
            let parts = match entry {
                Value::Multi(parts) => parts.as_slice(),
                single => std::slice::from_ref(single),
            };
            let url = parts.iter().find_map(|part| match part {
                Value::Url(url) => Some(url.clone()),
                _ => None,
            })?;
            let format = parts.iter().find_map(|part| match part {
                Value::Func(name, arguments) if name.eq_ignore_ascii_case("format") => {
                    arguments.first().map(|a| unquote(&a.to_string()).to_owned())
                }
                _ => None,
            });
            Some(FontSource { url, format })
        })
        .collect()
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
