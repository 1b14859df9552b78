use wombat_dom::{DomTree, ElementData, NodeId, NodeType, QualName, ns};

use crate::tokenizer::{Attribute, Mode, Token, XmlTokenizer};

/// A problem found while tokenizing or building the tree.
///
/// In [`Mode::Xml`] every well-formedness violation has `is_error` set and
/// aborts the parse. In [`Mode::TagSoup`] issues are informational.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Human readable description.
    pub message: String,
    /// 1-based source line the issue was found on.
    pub line: usize,
    /// Whether the issue makes the document not well-formed.
    pub is_error: bool,
}

/// The document could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (line {line})")]
pub struct ParseError {
    /// Description of the first fatal issue.
    pub message: String,
    /// 1-based source line of the first fatal issue.
    pub line: usize,
}

impl From<&ParseIssue> for ParseError {
    fn from(issue: &ParseIssue) -> Self {
        Self {
            message: issue.message.clone(),
            line: issue.line,
        }
    }
}

/// Namespace bindings declared on one element, `(prefix, uri)`.
type Scope = Vec<(Option<String>, String)>;

/// An element on the stack of open elements.
struct OpenElement {
    id: NodeId,
    /// Tag name as written in the source, prefix included.
    tag: String,
    scope: Scope,
}

/// [HTML § 13.1.2 Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified for
/// void elements."
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Start tags that close an open `p` element.
const CLOSES_PARAGRAPH: [&str; 29] = [
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Elements an implied end tag never searches past.
const SCOPE_BOUNDARIES: [&str; 10] = [
    "html", "body", "table", "td", "th", "caption", "button", "object", "template", "svg",
];

/// Builds a [`DomTree`] from the tokens of an [`XmlTokenizer`].
pub struct TreeBuilder {
    tokens: Vec<Token>,
    lines: Vec<usize>,
    mode: Mode,
    tree: DomTree,
    stack: Vec<OpenElement>,
    issues: Vec<ParseIssue>,
    line: usize,
}

impl TreeBuilder {
    /// Create a builder over a token stream. `lines` holds the source line of
    /// each token and may be empty.
    #[must_use]
    pub fn new(tokens: Vec<Token>, lines: Vec<usize>, mode: Mode) -> Self {
        Self {
            tokens,
            lines,
            mode,
            tree: DomTree::new(),
            stack: Vec::new(),
            issues: Vec::new(),
            line: 1,
        }
    }

    /// Create a builder from a tokenizer that has already run, carrying over
    /// its issues.
    #[must_use]
    pub fn from_tokenizer(tokenizer: XmlTokenizer, mode: Mode) -> Self {
        let (tokens, lines, issues) = tokenizer.into_parts();
        let mut builder = Self::new(tokens, lines, mode);
        builder.issues = issues;
        builder
    }

    /// Build the tree.
    ///
    /// # Errors
    ///
    /// In [`Mode::Xml`], returns the first well-formedness error found by the
    /// tokenizer or the tree builder.
    pub fn run(mut self) -> Result<(DomTree, Vec<ParseIssue>), ParseError> {
        let tokens = std::mem::take(&mut self.tokens);
        for (index, token) in tokens.into_iter().enumerate() {
            if let Some(&line) = self.lines.get(index) {
                self.line = line;
            }
            match token {
                Token::Doctype(_) => {}
                Token::StartTag {
                    name,
                    attributes,
                    self_closing,
                } => self.handle_start_tag(name, &attributes, self_closing),
                Token::EndTag { name } => self.handle_end_tag(&name),
                Token::Text(text) => self.handle_text(text),
                Token::Comment(text) => {
                    let id = self.tree.alloc(NodeType::Comment(text));
                    let parent = self.current_node();
                    self.tree.append_child(parent, id);
                }
                Token::ProcessingInstruction { target, data } => {
                    self.handle_processing_instruction(target, data);
                }
                Token::EndOfFile => {
                    self.handle_end_of_file();
                    break;
                }
            }
        }

        if let Some(error) = self.issues.iter().find(|issue| issue.is_error) {
            return Err(error.into());
        }

        tracing::debug!(
            mode = %self.mode,
            nodes = self.tree.len(),
            issues = self.issues.len(),
            "built document tree"
        );
        Ok((self.tree, self.issues))
    }

    fn current_node(&self) -> NodeId {
        self.stack.last().map_or(NodeId::ROOT, |open| open.id)
    }

    fn report(&mut self, message: impl Into<String>) {
        self.issues.push(ParseIssue {
            message: message.into(),
            line: self.line,
            is_error: self.mode == Mode::Xml,
        });
    }

    // ========== namespaces ==========

    /// [Namespaces in XML § 6.2](https://www.w3.org/TR/xml-names/#scoping-defaulting)
    ///
    /// "The scope of a namespace declaration declaring a prefix extends from
    /// the beginning of the start-tag in which it appears to the end of the
    /// corresponding end-tag"
    ///
    /// Returns `Err(())` for a prefix that is not bound.
    fn resolve_prefix(&self, prefix: Option<&str>, pending: &Scope) -> Result<Option<String>, ()> {
        if prefix == Some("xml") {
            return Ok(Some(ns::XML.to_owned()));
        }
        let scopes = std::iter::once(pending).chain(self.stack.iter().rev().map(|open| &open.scope));
        for scope in scopes {
            if let Some((_, uri)) = scope.iter().rev().find(|(p, _)| p.as_deref() == prefix) {
                // An empty default namespace undeclares it.
                return Ok((!uri.is_empty()).then(|| uri.clone()));
            }
        }
        match (prefix, self.mode) {
            (None, _) => Ok(None),
            (Some("xlink"), Mode::TagSoup) => Ok(Some(ns::XLINK.to_owned())),
            (Some(_), _) => Err(()),
        }
    }

    fn resolve_name(&mut self, raw: &str, pending: &Scope, is_attribute: bool) -> QualName {
        let (prefix, local) = match raw.split_once(':') {
            Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
            _ => (None, raw),
        };
        // "Default namespace declarations do not apply directly to attribute names"
        if is_attribute && prefix.is_none() {
            return QualName::local(raw);
        }
        match self.resolve_prefix(prefix, pending) {
            Ok(uri) => QualName::new(uri.as_deref(), local),
            Err(()) => {
                self.report(format!("unbound namespace prefix in {raw}"));
                QualName::local(raw)
            }
        }
    }

    // ========== token handlers ==========

    fn handle_start_tag(&mut self, tag: String, attributes: &[Attribute], self_closing: bool) {
        if self.mode == Mode::TagSoup {
            if self.merge_html_start_tag(&tag, attributes) {
                return;
            }
            self.ensure_soup_root(&tag);
            self.close_implied_elements(&tag);
        } else if self.stack.is_empty() && self.tree.document_element().is_some() {
            self.report(format!("second root element <{tag}>"));
        }

        // STEP 1: Collect namespace declarations.
        let mut scope: Scope = Vec::new();
        for attribute in attributes {
            if attribute.name == "xmlns" {
                scope.push((None, attribute.value.clone()));
            } else if let Some(prefix) = attribute.name.strip_prefix("xmlns:") {
                scope.push((Some(prefix.to_owned()), attribute.value.clone()));
            }
        }
        let declared = scope.clone();
        if self.mode == Mode::TagSoup && tag == "svg" && !scope.iter().any(|(p, _)| p.is_none()) {
            scope.push((None, ns::SVG.to_owned()));
        }

        // STEP 2: Resolve the element and attribute names.
        let name = self.resolve_name(&tag, &scope, false);
        let mut data = ElementData::new(name);
        data.namespaces = declared;
        for attribute in attributes {
            if attribute.name == "xmlns" || attribute.name.starts_with("xmlns:") {
                continue;
            }
            let name = self.resolve_name(&attribute.name, &scope, true);
            if data.attrs.contains_key(&name) {
                self.report(format!("duplicate attribute {}", attribute.name));
                continue;
            }
            let _ = data.attrs.insert(name, attribute.value.clone());
        }

        // STEP 3: Insert it, and open it unless it is empty.
        let id = self.tree.alloc(NodeType::Element(data));
        let parent = self.current_node();
        self.tree.append_child(parent, id);

        let is_void = self.mode == Mode::TagSoup && VOID_ELEMENTS.contains(&tag.as_str());
        if !self_closing && !is_void {
            self.stack.push(OpenElement { id, tag, scope });
        }
    }

    fn handle_end_tag(&mut self, tag: &str) {
        let Some(position) = self.stack.iter().rposition(|open| open.tag == tag) else {
            if !(self.mode == Mode::TagSoup && VOID_ELEMENTS.contains(&tag)) {
                self.report(format!("unexpected end tag </{tag}>"));
            }
            return;
        };

        if position + 1 != self.stack.len() {
            let current = self.stack.last().map(|open| open.tag.clone()).unwrap_or_default();
            self.report(format!("end tag </{tag}> does not match <{current}>"));
        }
        self.stack.truncate(position);
    }

    fn handle_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if self.stack.is_empty() {
            if text.trim().is_empty() {
                return;
            }
            match self.mode {
                Mode::Xml => {
                    self.report("text outside the root element");
                    return;
                }
                Mode::TagSoup => self.ensure_soup_root("#text"),
            }
        }

        let parent = self.current_node();
        if let Some(last) = self.tree.last_child(parent)
            && let Some(node) = self.tree.get_mut(last)
            && let NodeType::Text(existing) = &mut node.node_type
        {
            existing.push_str(&text);
            return;
        }
        let id = self.tree.alloc(NodeType::Text(text));
        self.tree.append_child(parent, id);
    }

    /// [XML § 2.6](https://www.w3.org/TR/xml/#sec-pi)
    ///
    /// "The target names 'XML', 'xml', and so on are reserved". The XML
    /// declaration is not kept in the tree.
    fn handle_processing_instruction(&mut self, target: String, data: String) {
        if target.eq_ignore_ascii_case("xml") {
            return;
        }
        let id = self
            .tree
            .alloc(NodeType::ProcessingInstruction { target, data });
        let parent = self.current_node();
        self.tree.append_child(parent, id);
    }

    fn handle_end_of_file(&mut self) {
        match self.mode {
            Mode::Xml => {
                if let Some(open) = self.stack.last() {
                    let message = format!("unclosed element <{}>", open.tag);
                    self.report(message);
                }
                if self.tree.document_element().is_none() {
                    self.report("no root element");
                }
            }
            Mode::TagSoup => {
                if self.tree.document_element().is_none() {
                    self.ensure_soup_root("#eof");
                }
            }
        }
        self.stack.clear();
    }

    // ========== tag soup recovery ==========

    /// Make sure there is an open `html` root to insert into.
    fn ensure_soup_root(&mut self, incoming: &str) {
        if !self.stack.is_empty() {
            return;
        }
        if let Some(root) = self.tree.document_element() {
            let tag = self
                .tree
                .as_element(root)
                .map(|data| data.name.local.clone())
                .unwrap_or_default();
            self.issues.push(ParseIssue {
                message: format!("content after </{tag}>"),
                line: self.line,
                is_error: false,
            });
            self.stack.push(OpenElement {
                id: root,
                tag,
                scope: Vec::new(),
            });
        } else if incoming != "html" {
            let id = self
                .tree
                .alloc(NodeType::Element(ElementData::new(QualName::local("html"))));
            self.tree.append_child(NodeId::ROOT, id);
            self.stack.push(OpenElement {
                id,
                tag: "html".to_owned(),
                scope: Vec::new(),
            });
        }
    }

    /// A second `<html>` start tag adds its missing attributes to the root.
    fn merge_html_start_tag(&mut self, tag: &str, attributes: &[Attribute]) -> bool {
        if tag != "html" {
            return false;
        }
        let Some(root) = self.tree.document_element() else {
            return false;
        };
        if let Some(data) = self.tree.as_element_mut(root) {
            for attribute in attributes {
                let _ = data
                    .attrs
                    .entry(QualName::local(&attribute.name))
                    .or_insert_with(|| attribute.value.clone());
            }
        }
        if self.stack.is_empty() {
            self.ensure_soup_root(tag);
        }
        true
    }

    /// [HTML § 13.1.2.4 Optional tags](https://html.spec.whatwg.org/multipage/syntax.html#optional-tags)
    fn close_implied_elements(&mut self, tag: &str) {
        if CLOSES_PARAGRAPH.contains(&tag) {
            self.close_nearest(&["p"], &[]);
        }
        match tag {
            "li" => self.close_nearest(&["li"], &["ul", "ol"]),
            "dt" | "dd" => self.close_nearest(&["dt", "dd"], &["dl"]),
            "option" | "optgroup" => {
                if self.stack.last().is_some_and(|open| open.tag == "option") {
                    let _ = self.stack.pop();
                }
            }
            "tr" => self.close_nearest(&["tr"], &["thead", "tbody", "tfoot"]),
            "td" | "th" => self.close_nearest(&["td", "th"], &["tr"]),
            "thead" | "tbody" | "tfoot" => self.close_nearest(&["thead", "tbody", "tfoot"], &[]),
            _ => {}
        }
    }

    /// Pop up to and including the nearest open element named in `targets`,
    /// unless a scope boundary comes first.
    fn close_nearest(&mut self, targets: &[&str], boundaries: &[&str]) {
        for position in (0..self.stack.len()).rev() {
            let tag = self.stack[position].tag.as_str();
            if targets.contains(&tag) {
                self.stack.truncate(position);
                return;
            }
            if boundaries.contains(&tag) || SCOPE_BOUNDARIES.contains(&tag) {
                return;
            }
        }
    }
}

/// Parse a well-formed, namespace-aware XML document.
///
/// # Errors
///
/// Returns the first well-formedness error.
pub fn parse_xml(text: &str) -> Result<DomTree, ParseError> {
    let mut tokenizer = XmlTokenizer::new(text, Mode::Xml);
    tokenizer.run();
    TreeBuilder::from_tokenizer(tokenizer, Mode::Xml)
        .run()
        .map(|(tree, _)| tree)
}

/// Parse HTML leniently. Never fails; the tree always has an element root.
#[must_use]
pub fn parse_html(text: &str) -> (DomTree, Vec<ParseIssue>) {
    let mut tokenizer = XmlTokenizer::new(text, Mode::TagSoup);
    tokenizer.run();
    TreeBuilder::from_tokenizer(tokenizer, Mode::TagSoup)
        .run()
        .unwrap_or_else(|_| (DomTree::new(), Vec::new()))
}

/// Print a tree to stdout, one node per line.
pub fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}Document"),
        NodeType::Element(data) => {
            if data.attrs.is_empty() {
                println!("{prefix}<{}>", data.name);
            } else {
                let attrs: Vec<String> = data
                    .attrs
                    .iter()
                    .map(|(name, value)| format!("{name}=\"{value}\""))
                    .collect();
                println!("{prefix}<{} {}>", data.name, attrs.join(" "));
            }
        }
        NodeType::Text(text) => {
            let display = text.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}\"{display}\"");
        }
        NodeType::Comment(text) => println!("{prefix}<!-- {text} -->"),
        NodeType::ProcessingInstruction { target, data } => println!("{prefix}<?{target} {data}?>"),
    }
    for &child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}
