//! [XML Serialization](https://w3c.github.io/DOM-Parsing/#dfn-xml-serialization)
//!
//! Writes a tree back out as namespace-well-formed XML. Prefixes declared in
//! the source are reused; namespaces that are in use but not declared get a
//! declaration on the element that first needs them.

use std::fmt::Write;

use crate::{DomTree, ElementData, NodeId, NodeType, ns};

/// Serialize the whole document.
#[must_use]
pub fn to_xml(tree: &DomTree) -> String {
    node_to_xml(tree, NodeId::ROOT)
}

/// Serialize one node and its subtree.
#[must_use]
pub fn node_to_xml(tree: &DomTree, id: NodeId) -> String {
    let mut serializer = Serializer {
        tree,
        out: String::new(),
        scopes: Vec::new(),
        generated: 0,
    };
    serializer.write_node(id);
    serializer.out
}

/// One level of in-scope namespace bindings: `(prefix, uri)`.
type Scope = Vec<(Option<String>, String)>;

struct Serializer<'a> {
    tree: &'a DomTree,
    out: String,
    scopes: Vec<Scope>,
    generated: usize,
}

impl Serializer<'_> {
    fn lookup_prefix(&self, uri: &str) -> Option<Option<&str>> {
        for scope in self.scopes.iter().rev() {
            for (prefix, bound) in scope.iter().rev() {
                if bound == uri && self.resolve(prefix.as_deref()) == Some(uri) {
                    return Some(prefix.as_deref());
                }
            }
        }
        None
    }

    fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for (p, uri) in scope.iter().rev() {
                if p.as_deref() == prefix {
                    return Some(uri.as_str());
                }
            }
        }
        None
    }

    fn write_node(&mut self, id: NodeId) {
        let tree = self.tree;
        let Some(node) = tree.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for &child in tree.children(id) {
                    self.write_node(child);
                }
            }
            NodeType::Element(data) => self.write_element(id, data),
            NodeType::Text(text) => escape_into(&mut self.out, text, false),
            NodeType::Comment(text) => {
                let _ = write!(self.out, "<!--{text}-->");
            }
            NodeType::ProcessingInstruction { target, data } => {
                if data.is_empty() {
                    let _ = write!(self.out, "<?{target}?>");
                } else {
                    let _ = write!(self.out, "<?{target} {data}?>");
                }
            }
        }
    }

    fn write_element(&mut self, id: NodeId, data: &ElementData) {
        let mut declared: Scope = data.namespaces.clone();
        self.scopes.push(declared.clone());

        // STEP 1: Choose the element's qualified name.
        let element_name = match data.name.ns.as_deref() {
            None => {
                if self.resolve(None).is_some_and(|uri| !uri.is_empty()) {
                    declared.push((None, String::new()));
                    self.bind(None, "");
                }
                data.name.local.clone()
            }
            Some(uri) => match self.lookup_prefix(uri) {
                Some(Some(prefix)) => format!("{prefix}:{}", data.name.local),
                Some(None) => data.name.local.clone(),
                None => {
                    declared.push((None, uri.to_owned()));
                    self.bind(None, uri);
                    data.name.local.clone()
                }
            },
        };

        // STEP 2: Choose attribute names, declaring prefixes as needed.
        let mut attributes = Vec::with_capacity(data.attrs.len());
        for (name, value) in &data.attrs {
            let qualified = match name.ns.as_deref() {
                None => name.local.clone(),
                Some(ns::XML) => format!("xml:{}", name.local),
                Some(uri) => {
                    let prefix = match self.lookup_prefix(uri) {
                        Some(Some(prefix)) => prefix.to_owned(),
                        _ => {
                            self.generated += 1;
                            let prefix = format!("ns{}", self.generated);
                            declared.push((Some(prefix.clone()), uri.to_owned()));
                            self.bind(Some(&prefix), uri);
                            prefix
                        }
                    };
                    format!("{prefix}:{}", name.local)
                }
            };
            attributes.push((qualified, value.as_str()));
        }

        // STEP 3: Write the start tag.
        let _ = write!(self.out, "<{element_name}");
        for (prefix, uri) in &declared {
            match prefix {
                Some(prefix) => {
                    let _ = write!(self.out, " xmlns:{prefix}=\"");
                }
                None => self.out.push_str(" xmlns=\""),
            }
            escape_into(&mut self.out, uri, true);
            self.out.push('"');
        }
        for (name, value) in attributes {
            let _ = write!(self.out, " {name}=\"");
            escape_into(&mut self.out, value, true);
            self.out.push('"');
        }

        // STEP 4: Children and end tag.
        let tree = self.tree;
        let children = tree.children(id);
        if children.is_empty() {
            self.out.push_str("/>");
        } else {
            self.out.push('>');
            for &child in children {
                self.write_node(child);
            }
            let _ = write!(self.out, "</{element_name}>");
        }

        let _ = self.scopes.pop();
    }

    fn bind(&mut self, prefix: Option<&str>, uri: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((prefix.map(str::to_owned), uri.to_owned()));
        }
    }
}

fn escape_into(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\n' if attribute => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
}
