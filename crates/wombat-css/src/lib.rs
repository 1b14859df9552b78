//! CSS tokenizer, parser, selector matching, units and colors for the wombat document model.
//!
//! # Scope
//!
//! This crate implements:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//!   - Identifiers, custom property names, numbers, strings, hex after `#`
//!   - `/* */` and `<!-- -->` comments, collapsed whitespace
//!   - Escape sequences in double-quoted strings
//!
//! - **CSS Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   - Bracket structure with recovery from unbalanced input
//!   - Style rules, declarations, `!important`, custom properties
//!   - `@import`, `@media`, `@supports`, `@font-face` and the other at-rules
//!   - Values: functions, `var()`, `url()`, arithmetic
//!   - Serialization back to CSS text
//!
//! - **CSS Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/))
//!   - Type, class, ID, universal and attribute selectors
//!   - Structural pseudo-classes, `:nth-*()`, `:not()`, `:is()`, `:has()`
//!   - Combinators (descendant, child, sibling)
//!   - Summed priorities and an indexed matcher
//!
//! - **Values**: lengths ([CSS Values](https://www.w3.org/TR/css-values-4/)),
//!   colors ([CSS Color](https://www.w3.org/TR/css-color-4/)), media queries
//!   ([Media Queries](https://www.w3.org/TR/mediaqueries-4/)) and `var()`
//!   substitution.
//!
//! # Not Yet Implemented
//!
//! - Namespace prefixes in selectors (`svg|rect`)
//! - Nested style rules
//! - `calc()` evaluation

/// Syntax tree node types.
pub mod ast;
/// Color parsing.
pub mod color;
/// Errors raised while evaluating values.
pub mod error;
/// Stylesheet link scanning.
pub mod links;
/// Compiled, indexed stylesheet matcher.
pub mod matcher;
/// Media query evaluation.
pub mod media;
/// Stylesheet parser per [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing).
pub mod parser;
/// CSS selector compilation and matching per [Selectors Level 4](https://www.w3.org/TR/selectors-4/).
pub mod selector;
/// Syntax tree to CSS text.
pub mod serialize;
/// CSS tokenizer per [§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization).
pub mod tokenizer;
/// Length units.
pub mod units;
/// Typed declaration values.
pub mod value;

pub use ast::{Arg, Node, NodeKind};
pub use color::{ColorSpec, Rgba, named_color, parse_color};
pub use error::CssError;
pub use links::{FontFace, FontSource, scan_font_faces, scan_fonts, scan_imports, scan_urls};
pub use matcher::{CompiledMatcher, IMPORTANT, Matched};
pub use media::MediaEnvironment;
pub use parser::{
    Stylesheet, build_structure, parse_css, parse_declaration_block, parse_inline_style,
};
pub use selector::{ComplexSelector, MatchContext, NoContext};
pub use serialize::serialize;
pub use tokenizer::{CssTokenizer, detokenize, tokenize};
pub use units::{parse_number, units};
pub use value::{Declaration, Value};

/// Every resource a stylesheet refers to: `@import` targets, then `url()`
/// values of style rules, then `@font-face` sources.
#[must_use]
pub fn scan_links(root: &Node) -> Vec<String> {
    let mut links = scan_imports(root);
    links.extend(scan_urls(root));
    links.extend(scan_fonts(root));
    links
}
