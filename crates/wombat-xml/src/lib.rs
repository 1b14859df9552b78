//! XML and HTML parsing for the wombat document model.
//!
//! # Scope
//!
//! This crate implements:
//! - **XML Tokenizer** ([XML 1.0 § 2](https://www.w3.org/TR/xml/#sec-documents))
//!   - Start/end/empty-element tags, attributes, text, CDATA sections
//!   - Comments, processing instructions, DOCTYPE skipping
//!   - Predefined, numeric and (in tag-soup mode) HTML named character references
//!
//! - **Tree Builder** ([Namespaces in XML](https://www.w3.org/TR/xml-names/))
//!   - Namespace resolution of elements and attributes
//!   - Well-formedness checks in XML mode
//!   - Lenient HTML recovery in tag-soup mode: void elements, implied end
//!     tags, raw text elements, case folding, a single `html` root
//!
//! # Not Yet Implemented
//!
//! - DTD internal subsets and custom entities
//! - The full WHATWG tree construction algorithm

/// Tree construction from a token stream.
pub mod parser;
/// Tokenizer for converting input into tokens.
pub mod tokenizer;

pub use parser::{ParseError, ParseIssue, TreeBuilder, parse_html, parse_xml, print_tree};
pub use tokenizer::{Attribute, Mode, Token, XmlTokenizer};
