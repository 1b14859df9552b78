//! CSS tokenizer module.

/// Lexer states and scanning routines.
pub mod lexer;

pub use lexer::{CssTokenizer, detokenize, tokenize};
