//! Stylesheet syntax tree.
//!
//! Every node has a [`NodeKind`] and an ordered list of arguments, each of
//! which is either a raw token or a nested node. The same representation is
//! used for the intermediate bracket tree of the structural parser
//! (`curly`, `brace`, `square`, `item`) and for the typed tree the semantic
//! builder produces from it.

use std::fmt;

use serde::Serialize;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Name of a syntax tree node.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    // ========== structure ==========
    /// Root of a stylesheet.
    Stylesheet,
    /// `{ ... }` block.
    Curly,
    /// `( ... )` block.
    Brace,
    /// `[ ... ]` block.
    Square,
    /// One `;`- or block-terminated statement.
    Item,

    // ========== statements ==========
    /// Body of a block at-rule such as `@media`.
    Scope,
    /// Qualified rule: `[selector, rules]`.
    Style,
    /// Declaration list.
    Rules,
    /// Declaration: `[name, values]` or `[name, values, importance]`.
    Rule,
    /// Custom property declaration: `[--name, values]`.
    VarDecl,
    /// `!important` suffix: `[important]`.
    Importance,
    /// At-rule terminated by `;`: `[name, prelude]`.
    AtruleSimple,
    /// At-rule with a declaration block: `[name, prelude, rules]`.
    AtruleStyle,
    /// At-rule with nested rules: `[name, prelude, scope]`.
    AtruleBlock,
    /// At-rule prelude.
    Prelude,

    // ========== values ==========
    /// Comma and space separated value list.
    Values,
    /// A single value.
    Value,
    /// Several tokens forming one value.
    Multivalue,
    /// `,` between values.
    Separator,
    /// Infix arithmetic: `[lhs, infix-operator, rhs, ...]`.
    Expression,
    /// `+`, `-`, `*` or `/`.
    InfixOperator,
    /// `name(arguments)`.
    Function,
    /// Function arguments.
    Arguments,
    /// `name=value` argument.
    NamedArgument,
    /// `url(...)` with quotes removed.
    Url,
    /// `var(--name)` or `var(--name, fallback)`.
    Var,

    // ========== selectors ==========
    /// Comma separated list of selector sequences.
    Selector,
    /// Compound selectors joined by path operators.
    SelectorSeq,
    /// One compound selector.
    SelectorSingle,
    /// Combinator: ` `, `>`, `+` or `~`.
    PathOperator,
    /// Type selector or `*`.
    SelectorTag,
    /// `.class`
    SelectorClass,
    /// `#id`
    SelectorId,
    /// `[name op value]`
    SelectorAttr,
    /// `[name]`
    SelectorAttrPresent,
    /// `:name`
    SelectorPseudoClass,
    /// `:name(arguments)`
    SelectorPseudoClassFn,
    /// `::name`
    SelectorPseudoElement,
    /// `::name(arguments)`
    SelectorPseudoElementFn,
    /// Arguments of a functional pseudo-class or pseudo-element.
    SelectorFunctionArguments,
    /// Keyframe selector such as `50%`.
    SelectorPercentage,

    // ========== preludes ==========
    /// Comma separated media queries.
    MediaTests,
    /// One media query: types and features joined by `and`.
    MediaTest,
    /// `(name: value)` media feature.
    MediaProperty,
    /// Media type tokens such as `only screen`.
    MediaType,
    /// `(name: value)` in `@supports`.
    SupportsTest,
    /// Boolean combination in `@supports`.
    Boolexpr,
    /// `not`, `and` or `or` in `@supports`.
    Operator,
}

/// One argument of a [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Arg {
    /// A raw token.
    Text(String),
    /// A nested node.
    Node(Node),
}

impl Arg {
    /// The token, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Node(_) => None,
        }
    }

    /// The node, if this is one.
    #[must_use]
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }

    /// Whether this is exactly the token `text`.
    #[must_use]
    pub fn is_text(&self, text: &str) -> bool {
        self.as_text() == Some(text)
    }

    /// Whether this is a node of the given kind.
    #[must_use]
    pub fn is_node(&self, kind: NodeKind) -> bool {
        self.as_node().is_some_and(|node| node.kind == kind)
    }
}

impl From<Node> for Arg {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<&str> for Arg {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Arg {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// A syntax tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node {
    /// What the node represents.
    pub kind: NodeKind,
    /// Ordered arguments.
    pub args: Vec<Arg>,
}

impl Node {
    /// Create a node.
    #[must_use]
    pub const fn new(kind: NodeKind, args: Vec<Arg>) -> Self {
        Self { kind, args }
    }

    /// The token at `index`, if that argument is a token.
    #[must_use]
    pub fn text(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Arg::as_text)
    }

    /// The node at `index`, if that argument is a node.
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Self> {
        self.args.get(index).and_then(Arg::as_node)
    }

    /// Nested nodes, skipping tokens.
    pub fn nodes(&self) -> impl Iterator<Item = &Self> {
        self.args.iter().filter_map(Arg::as_node)
    }

    /// Nested nodes of one kind.
    pub fn nodes_of(&self, kind: NodeKind) -> impl Iterator<Item = &Self> {
        self.nodes().filter(move |node| node.kind == kind)
    }

    /// Preorder walk over this node and every nested node.
    pub fn walk(&self, visit: &mut impl FnMut(&Self)) {
        visit(self);
        for child in self.nodes() {
            child.walk(visit);
        }
    }
}

/// Compact form: `kind(arg, arg, ...)`, tokens quoted.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (index, arg) in self.args.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            match arg {
                Arg::Text(text) => write!(f, "{text:?}")?,
                Arg::Node(node) => write!(f, "{node}")?,
            }
        }
        f.write_str(")")
    }
}
