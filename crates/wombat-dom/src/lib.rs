//! Element trees for the wombat document model.
//!
//! This crate provides an arena-based XML tree following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/) and
//! [Namespaces in XML](https://www.w3.org/TR/xml-names/).
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. The
//! "shadow parent" relation used by `<use>` instancing lives in a side table on
//! the tree so that the DOM structure itself is never altered by it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub mod serialize;

pub use serialize::{node_to_xml, to_xml};

/// Well-known namespace URIs.
pub mod ns {
    /// [XHTML namespace](https://www.w3.org/1999/xhtml/)
    pub const XHTML: &str = "http://www.w3.org/1999/xhtml";
    /// [SVG namespace](https://www.w3.org/2000/svg)
    pub const SVG: &str = "http://www.w3.org/2000/svg";
    /// [XLink namespace](https://www.w3.org/1999/xlink)
    pub const XLINK: &str = "http://www.w3.org/1999/xlink";
    /// [§ 3 Declaring Namespaces](https://www.w3.org/TR/xml-names/#ns-decl)
    /// "The prefix xml is by definition bound to the namespace name
    /// http://www.w3.org/XML/1998/namespace."
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// "The prefix xmlns is used only to declare namespace bindings and is by
    /// definition bound to the namespace name http://www.w3.org/2000/xmlns/."
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
/// "Each node has an associated node document..."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4 Qualified Names](https://www.w3.org/TR/xml-names/#ns-qualnames)
///
/// An expanded name: optional namespace URI plus local name. Displayed in
/// Clark notation, `{namespace}local`, which is also the form selectors are
/// compiled against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualName {
    /// Namespace URI, `None` for names in no namespace.
    pub ns: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QualName {
    /// Create a name in namespace `ns`.
    #[must_use]
    pub fn new(ns: Option<&str>, local: &str) -> Self {
        Self {
            ns: ns.map(str::to_owned),
            local: local.to_owned(),
        }
    }

    /// Create a name in no namespace.
    #[must_use]
    pub fn local(local: &str) -> Self {
        Self::new(None, local)
    }

    /// Parse Clark notation (`{ns}local` or plain `local`).
    #[must_use]
    pub fn parse(clark: &str) -> Self {
        clark
            .strip_prefix('{')
            .and_then(|rest| rest.split_once('}'))
            .map_or_else(
                || Self::local(clark),
                |(ns, local)| Self::new(Some(ns), local),
            )
    }

    /// Whether this name is `local` in namespace `ns`.
    #[must_use]
    pub fn is(&self, ns: Option<&str>, local: &str) -> bool {
        self.ns.as_deref() == ns && self.local == local
    }
}

impl fmt::Display for QualName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Map of attribute names to values for an element.
///
/// Ordered so that serialization is deterministic.
pub type AttributesMap = BTreeMap<QualName, String>;

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships,
/// enabling O(1) traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,
}

impl Node {
    fn detached(node_type: NodeType) -> Self {
        Self {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    /// "Element nodes are simply known as elements."
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
    /// [§ 4.13 Interface ProcessingInstruction](https://dom.spec.whatwg.org/#interface-processinginstruction)
    /// "ProcessingInstruction nodes have an associated target."
    ProcessingInstruction {
        /// The PI target, e.g. `xml-stylesheet`.
        target: String,
        /// Everything between the target and `?>`.
        data: String,
    },
}

/// Element-specific data.
///
/// Per [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element):
/// "Elements have an associated namespace, namespace prefix, local name..."
#[derive(Debug, Clone)]
pub struct ElementData {
    /// Expanded element name.
    pub name: QualName,
    /// "An element has an associated attribute list"
    pub attrs: AttributesMap,
    /// Namespace declarations made on this element, `(prefix, uri)` in source
    /// order. A `None` prefix is a default namespace declaration.
    pub namespaces: Vec<(Option<String>, String)>,
}

impl ElementData {
    /// Create an element with no attributes.
    #[must_use]
    pub fn new(name: QualName) -> Self {
        Self {
            name,
            attrs: AttributesMap::new(),
            namespaces: Vec::new(),
        }
    }

    /// Attribute in no namespace.
    #[must_use]
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attr_ns(None, local)
    }

    /// Attribute in namespace `ns`.
    #[must_use]
    pub fn attr_ns(&self, ns: Option<&str>, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name.is(ns, local))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, name: QualName, value: impl Into<String>) {
        let _ = self.attrs.insert(name, value.into());
    }

    /// Returns the element's identifier: `id`, falling back to `xml:id`.
    ///
    /// [xml:id Version 1.0](https://www.w3.org/TR/xml-id/)
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id").or_else(|| self.attr_ns(Some(ns::XML), "id"))
    }

    /// Class names from the class attribute.
    ///
    /// Per [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes):
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens representing the various classes that the element belongs to."
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }
}

/// Arena-based XML tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// "The DOM represents a document as a tree."
///
/// The Document node is always at [`NodeId::ROOT`]. Nodes are never freed;
/// removing a child only detaches it.
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
    /// node -> instantiating element, for `<use>` expansions
    shadow_parents: HashMap<NodeId, NodeId>,
    /// instantiating element -> number of nodes pointing at it
    shadow_refs: HashMap<NodeId, usize>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::detached(NodeType::Document)],
            shadow_parents: HashMap::new(),
            shadow_refs: HashMap::new(),
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes ever allocated, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::detached(node_type));
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before null."
    ///
    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.0].parent {
            self.remove_child(old_parent, child);
        }

        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// [§ 4.2.3 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detach `child` from `parent`, relinking its siblings. Does nothing
    /// when `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.0].parent != Some(parent) {
            return;
        }
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;

        self.nodes[parent.0].children.retain(|&id| id != child);
        if let Some(prev) = prev {
            self.nodes[prev.0].next_sibling = next;
        }
        if let Some(next) = next {
            self.nodes[next.0].prev_sibling = prev;
        }

        let node = &mut self.nodes[child.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Get the parent of a node (`getparent()`).
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get the parent element of a node, skipping the Document node.
    #[must_use]
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.as_element(p).is_some())
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Element children of a node, in order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.as_element(c).is_some())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node (`getnext()`).
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node (`getprevious()`).
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Zero-based position of an element among its parent's element children.
    #[must_use]
    pub fn element_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.element_children(parent).position(|c| c == id)
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Check if `descendant` is a descendant of `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, descendant: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(descendant).any(|id| id == ancestor)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Iterate over preceding siblings (from immediately before to first child).
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// [§ 4.2.6 Tree order](https://dom.spec.whatwg.org/#concept-tree-order)
    ///
    /// Pre-order walk of `id` and its descendants (`iter()`).
    #[must_use]
    pub fn iter(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            stack: vec![id],
        }
    }

    /// Pre-order walk over elements only.
    pub fn elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.iter(id).filter(|&n| self.as_element(n).is_some())
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// [§ 4.4 textContent](https://dom.spec.whatwg.org/#dom-node-textcontent)
    ///
    /// "The descendant text content of a node node is the concatenation of the
    /// data of all the Text node descendants of node, in tree order."
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.iter(id).filter_map(|n| self.as_text(n)).collect()
    }

    /// [§ 4.5 document element](https://dom.spec.whatwg.org/#document-element)
    ///
    /// "The document element of a document is the element whose parent is that
    /// document, if it exists; otherwise null." (`getroot()`)
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(NodeId::ROOT).next()
    }

    /// Processing instructions that precede the document element, as
    /// `(target, data)` pairs.
    pub fn prolog_instructions(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.children(NodeId::ROOT)
            .iter()
            .take_while(|&&id| self.as_element(id).is_none())
            .filter_map(|&id| match self.get(id).map(|n| &n.node_type) {
                Some(NodeType::ProcessingInstruction { target, data }) => {
                    Some((target.as_str(), data.as_str()))
                }
                _ => None,
            })
    }

    /// First element in tree order whose `id` (or `xml:id`) equals `id`.
    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements(NodeId::ROOT)
            .find(|&n| self.as_element(n).and_then(ElementData::id) == Some(id))
    }

    /// Put every element that has no namespace into `namespace`, declaring it
    /// as the default namespace on the document element.
    ///
    /// Used for HTML documents whose source omitted the XHTML namespace.
    pub fn apply_default_namespace(&mut self, namespace: &str) {
        let elements: Vec<NodeId> = self.elements(NodeId::ROOT).collect();
        for id in elements {
            if let Some(data) = self.as_element_mut(id) {
                if data.name.ns.is_none() {
                    data.name.ns = Some(namespace.to_owned());
                }
                data.namespaces.retain(|(prefix, _)| prefix.is_some());
            }
        }
        if let Some(root) = self.document_element() {
            if let Some(data) = self.as_element_mut(root) {
                data.namespaces.insert(0, (None, namespace.to_owned()));
            }
        }
    }

    /// Deep-copy the subtree rooted at `node` of `source` into this tree.
    ///
    /// The copy is detached; the returned id is its root.
    pub fn import_subtree(&mut self, source: &Self, node: NodeId) -> NodeId {
        let Some(original) = source.get(node) else {
            return self.alloc(NodeType::Text(String::new()));
        };
        let copy = self.alloc(original.node_type.clone());
        for &child in source.children(node) {
            let child_copy = self.import_subtree(source, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Instantiate `node` of `source` as a shadow child of `instantiator`
    /// (the `<use>` element). The copy is not attached to the DOM; only its
    /// shadow parent points back at `instantiator`.
    pub fn instantiate(&mut self, source: &Self, node: NodeId, instantiator: NodeId) -> NodeId {
        let copy = self.import_subtree(source, node);
        self.set_shadow_parent(copy, instantiator);
        copy
    }

    // ========== shadow parents ==========

    /// Record `parent` as the shadow parent of `node`, replacing any previous
    /// one.
    pub fn set_shadow_parent(&mut self, node: NodeId, parent: NodeId) {
        self.clear_shadow_parent(node);
        let _ = self.shadow_parents.insert(node, parent);
        *self.shadow_refs.entry(parent).or_insert(0) += 1;
    }

    /// Drop the shadow parent of `node`. When the last node referring to an
    /// instantiator is cleared, its registry entry is reclaimed.
    pub fn clear_shadow_parent(&mut self, node: NodeId) {
        let Some(parent) = self.shadow_parents.remove(&node) else {
            return;
        };
        if let Some(count) = self.shadow_refs.get_mut(&parent) {
            *count -= 1;
            if *count == 0 {
                let _ = self.shadow_refs.remove(&parent);
            }
        }
    }

    /// Shadow parent of `node`, if one was recorded.
    #[must_use]
    pub fn shadow_parent(&self, node: NodeId) -> Option<NodeId> {
        self.shadow_parents.get(&node).copied()
    }

    /// Logical parent: the shadow parent when set, else the DOM parent.
    #[must_use]
    pub fn logical_parent(&self, node: NodeId) -> Option<NodeId> {
        self.shadow_parent(node).or_else(|| self.parent(node))
    }

    /// How many nodes currently name `parent` as their shadow parent.
    #[must_use]
    pub fn shadow_ref_count(&self, parent: NodeId) -> usize {
        self.shadow_refs.get(&parent).copied().unwrap_or(0)
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator over preceding siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    tree: &'a DomTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Parse the pseudo-attributes of a processing instruction such as
/// `xml-stylesheet`.
///
/// [Associating Style Sheets with XML documents § 2](https://www.w3.org/TR/xml-stylesheet/#the-xml-stylesheet-processing-instruction)
///
/// `href="a.css" type='text/css'` gives `{href: a.css, type: text/css}`.
/// Malformed trailing input is ignored.
#[must_use]
pub fn pseudo_attributes(data: &str) -> BTreeMap<String, String> {
    let mut result = BTreeMap::new();
    let mut rest = data.trim_start();
    while let Some((name, after_name)) = rest.split_once('=') {
        let name = name.trim();
        let after_name = after_name.trim_start();
        let Some(quote) = after_name.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some((value, after_value)) = after_name[1..].split_once(quote) else {
            break;
        };
        let _ = result.insert(name.to_owned(), value.to_owned());
        rest = after_value.trim_start();
    }
    result
}
