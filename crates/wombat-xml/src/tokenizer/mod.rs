//! XML tokenizer module.

/// Character reference decoding.
pub mod entities;
/// Tokenizer state and scanning routines.
pub mod scanner;
/// Token types produced by the tokenizer.
pub mod token;

pub use scanner::{Mode, XmlTokenizer};
pub use token::{Attribute, Token};
