//! Stylesheet parser.
//!
//! Parsing runs in two stages: [`build_structure`] groups tokens by their
//! brackets, then the semantic builder recognizes statements, selectors,
//! declarations, values and at-rule preludes. Neither stage fails: every
//! problem is recorded as an issue and the offending statement is skipped.

mod builder;
mod structure;

pub use structure::build_structure;

use tracing::debug;

use crate::ast::{Node, NodeKind};
use crate::tokenizer::tokenize;
use crate::value::Declaration;

pub(crate) use builder::raw_text;

/// A parsed stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stylesheet {
    /// The `stylesheet` node.
    pub root: Node,
    /// Problems found while parsing, in source order.
    pub issues: Vec<String>,
}

impl Stylesheet {
    /// Parse stylesheet source text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let tokens = tokenize(text);
        let (structure, mut issues) = build_structure(&tokens);
        let (root, semantic_issues) = builder::Builder::new().build(structure);
        issues.extend(semantic_issues);
        if !issues.is_empty() {
            debug!(count = issues.len(), "stylesheet parsed with issues");
        }
        Self { root, issues }
    }

    /// Top level statements.
    pub fn statements(&self) -> impl Iterator<Item = &Node> {
        self.root.nodes()
    }

    /// Whether the stylesheet has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.args.is_empty()
    }
}

/// Parse stylesheet source text.
#[must_use]
pub fn parse_css(text: &str) -> Stylesheet {
    Stylesheet::parse(text)
}

/// Parse the contents of a declaration block, such as a `style` attribute.
///
/// Returns the `rules` node and its issues.
#[must_use]
pub fn parse_declaration_block(text: &str) -> (Node, Vec<String>) {
    let tokens = tokenize(text);
    let (structure, mut issues) = build_structure(&tokens);
    let (rules, semantic_issues) = builder::Builder::new().build_declarations(structure);
    issues.extend(semantic_issues);
    debug_assert_eq!(rules.kind, NodeKind::Rules);
    (rules, issues)
}

/// Declarations of a `style` attribute.
#[must_use]
pub fn parse_inline_style(text: &str) -> Vec<Declaration> {
    let (rules, _) = parse_declaration_block(text);
    Declaration::from_rules(&rules)
}
