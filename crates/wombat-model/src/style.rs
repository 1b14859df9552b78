//! The style cascade.
//!
//! [§ 6 Cascading](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! An attribute of an element is looked up in this order:
//!
//! 1. the element's `style` attribute,
//! 2. the document's stylesheets in link order; the declaration with the
//!    highest priority wins and ties go to the later sheet,
//! 3. the SVG presentation attribute of the same name,
//! 4. the parent element, for inherited properties.
//!
//! Results are memoized in the view until its styles are invalidated.

use std::collections::HashMap;
use std::sync::Arc;

use wombat_css::{Matched, Value, parse_inline_style};
use wombat_dom::{DomTree, NodeId};

use crate::document::Document;
use crate::loader::Model;
use crate::view::{View, ViewContext};

/// [§ 7.1 Inherited Properties](https://www.w3.org/TR/css-cascade-4/#inherited-property)
/// "Some properties are inherited from an ancestor element to its
/// descendants."
const INHERITED: &[&str] = &[
    "clip-rule",
    "color",
    "color-interpolation",
    "cursor",
    "direction",
    "dominant-baseline",
    "fill",
    "fill-opacity",
    "fill-rule",
    "font",
    "font-family",
    "font-size",
    "font-size-adjust",
    "font-stretch",
    "font-style",
    "font-variant",
    "font-weight",
    "letter-spacing",
    "line-height",
    "list-style",
    "list-style-position",
    "list-style-type",
    "marker",
    "marker-end",
    "marker-mid",
    "marker-start",
    "paint-order",
    "quotes",
    "shape-rendering",
    "stroke",
    "stroke-dasharray",
    "stroke-dashoffset",
    "stroke-linecap",
    "stroke-linejoin",
    "stroke-miterlimit",
    "stroke-opacity",
    "stroke-width",
    "text-align",
    "text-anchor",
    "text-indent",
    "text-rendering",
    "text-transform",
    "visibility",
    "white-space",
    "word-spacing",
    "writing-mode",
];

/// Whether `name` is inherited by default.
#[must_use]
pub fn is_inherited(name: &str) -> bool {
    name.starts_with("--") || INHERITED.binary_search(&name).is_ok()
}

impl Model {
    /// Effective value of property `name` on `node` of `document`, or of
    /// its `pseudo_element` (`before`, `after`, ...).
    ///
    /// `var()` references are substituted. Returns `None` when nothing
    /// declares the property.
    #[must_use]
    pub fn get_attribute(
        &self,
        view: &View,
        document: &Arc<Document>,
        node: NodeId,
        pseudo_element: Option<&str>,
        name: &str,
    ) -> Option<String> {
        let tree = document.tree()?;
        let _ = tree.as_element(node)?;

        let key = (
            Arc::as_ptr(document).addr(),
            node,
            pseudo_element.map(str::to_owned),
            name.to_owned(),
        );
        if let Some(value) = view.cached_style(&key) {
            return value;
        }

        let context = view.match_context();
        let declared = self.declared(view, document, tree, node, pseudo_element, name, &context);
        let value = match declared {
            Some(value) if value.is_keyword("inherit") => {
                self.inherited(view, document, tree, node, pseudo_element, name)
            }
            Some(value) => Some(value.to_string()),
            None if pseudo_element.is_some() || is_inherited(name) => {
                self.inherited(view, document, tree, node, pseudo_element, name)
            }
            None => None,
        }
        .filter(|value| !value.is_empty());

        view.cache_style(key, value.clone());
        value
    }

    /// Value of the parent element, or of the originating element for a
    /// pseudo-element.
    fn inherited(
        &self,
        view: &View,
        document: &Arc<Document>,
        tree: &DomTree,
        node: NodeId,
        pseudo_element: Option<&str>,
        name: &str,
    ) -> Option<String> {
        if pseudo_element.is_some() {
            return self.get_attribute(view, document, node, None, name);
        }
        let parent = tree.parent_element(node)?;
        self.get_attribute(view, document, parent, None, name)
    }

    /// The value declared for `node` itself, `var()` references resolved.
    #[allow(clippy::too_many_arguments)]
    fn declared(
        &self,
        view: &View,
        document: &Arc<Document>,
        tree: &DomTree,
        node: NodeId,
        pseudo_element: Option<&str>,
        name: &str,
        context: &ViewContext,
    ) -> Option<Value> {
        if pseudo_element.is_none() {
            if let Some(value) = inline_declaration(tree, node, name) {
                if !value.has_vars() {
                    return Some(value);
                }
                let vars = custom_properties(tree, node, |ancestor| {
                    inline_custom_properties(tree, ancestor)
                });
                return Some(value.evaluate(&vars));
            }
        }

        let url = self.document_url(document).unwrap_or_default();
        let default_ns = document.default_namespace();
        let mut best: Option<(Matched, Arc<Document>)> = None;
        for (_, sheet) in self.stylesheets(&url, document) {
            let Some(css) = sheet.as_css() else {
                continue;
            };
            let matcher = css.matcher(default_ns);
            let Some(matched) = matcher
                .match_element(tree, node, pseudo_element, context)
                .remove(name)
            else {
                continue;
            };
            if best
                .as_ref()
                .is_none_or(|(current, _)| matched.priority >= current.priority)
            {
                best = Some((matched, sheet));
            }
        }
        if let Some((matched, sheet)) = best {
            if !matched.value.has_vars() {
                return Some(matched.value);
            }
            let vars = sheet
                .as_css()
                .map(|css| {
                    let matcher = css.matcher(default_ns);
                    custom_properties(tree, node, |ancestor| {
                        matcher
                            .match_element(tree, ancestor, None, context)
                            .into_iter()
                            .filter(|(property, _)| property.starts_with("--"))
                            .map(|(property, matched)| (property, matched.value))
                            .collect()
                    })
                })
                .unwrap_or_default();
            return Some(matched.value.evaluate(&vars));
        }

        if pseudo_element.is_none() && matches!(**document, Document::Svg(_)) {
            let attribute = tree.as_element(node)?.attr(name)?;
            return Some(Value::Str(attribute.to_owned()));
        }
        None
    }
}

/// The last declaration of `name` in the element's `style` attribute;
/// `!important` declarations beat normal ones.
fn inline_declaration(tree: &DomTree, node: NodeId, name: &str) -> Option<Value> {
    let style = tree.as_element(node)?.attr("style")?;
    let declarations = parse_inline_style(style);
    declarations
        .iter()
        .filter(|declaration| declaration.name == name)
        .max_by_key(|declaration| declaration.important)
        .map(|declaration| declaration.value.clone())
}

fn inline_custom_properties(tree: &DomTree, node: NodeId) -> HashMap<String, Value> {
    let Some(style) = tree.as_element(node).and_then(|element| element.attr("style")) else {
        return HashMap::new();
    };
    parse_inline_style(style)
        .into_iter()
        .filter(|declaration| declaration.is_custom_property())
        .map(|declaration| (declaration.name, declaration.value))
        .collect()
}

/// Custom properties visible on `node`: its own and those of its
/// ancestors, the closest declaration of each name winning.
fn custom_properties(
    tree: &DomTree,
    node: NodeId,
    declared_on: impl Fn(NodeId) -> HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut vars = HashMap::new();
    let elements = std::iter::once(node)
        .chain(tree.ancestors(node))
        .filter(|&element| tree.as_element(element).is_some());
    for element in elements {
        for (name, value) in declared_on(element) {
            let _ = vars.entry(name).or_insert(value);
        }
    }
    vars
}
