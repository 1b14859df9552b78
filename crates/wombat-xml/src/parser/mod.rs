//! Tree construction.

mod tree_builder;

pub use tree_builder::{ParseError, ParseIssue, TreeBuilder, parse_html, parse_xml, print_tree};
