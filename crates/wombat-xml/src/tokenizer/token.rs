/// An attribute on a start tag token.
///
/// [XML 1.0 § 3.1](https://www.w3.org/TR/xml/#NT-Attribute)
/// "Attribute ::= Name Eq AttValue"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Raw (possibly prefixed) attribute name.
    pub name: String,
    /// Value with character references decoded.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self { name, value }
    }
}

/// Tokens emitted to the tree builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `<!DOCTYPE ...>` or another markup declaration; the tree builder skips it.
    Doctype(String),

    /// [§ 3.1 Start-Tags](https://www.w3.org/TR/xml/#sec-starttags)
    StartTag {
        /// Raw (possibly prefixed) tag name.
        name: String,
        /// Attributes in source order, duplicates dropped.
        attributes: Vec<Attribute>,
        /// Set for empty-element tags (`<x/>`).
        self_closing: bool,
    },

    /// [§ 3.1 End-Tags](https://www.w3.org/TR/xml/#sec-starttags)
    EndTag {
        /// Raw (possibly prefixed) tag name.
        name: String,
    },

    /// Character data, with references decoded. CDATA sections arrive as text.
    Text(String),

    /// [§ 2.5 Comments](https://www.w3.org/TR/xml/#sec-comments)
    Comment(String),

    /// [§ 2.6 Processing Instructions](https://www.w3.org/TR/xml/#sec-pi)
    ProcessingInstruction {
        /// "PI targets identify the application to which the instruction is directed."
        target: String,
        /// Everything after the target, leading whitespace removed.
        data: String,
    },

    /// End of input.
    EndOfFile,
}

impl Token {
    /// Whether this token is text made only of whitespace.
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Text(text) if text.chars().all(char::is_whitespace))
    }
}
