use thiserror::Error;

/// Errors from evaluating CSS values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    /// A number was expected but a different token was found.
    #[error("not a number: {0:?}")]
    NotANumber(String),
    /// An `em`/`ex` length was given without a font size to resolve it.
    #[error("`em_size` not specified for {0:?}")]
    MissingEmSize(String),
    /// A percentage was given without the length it is relative to.
    #[error("percentage base not specified for {0:?}")]
    MissingPercentage(String),
    /// The color specification is not understood.
    #[error("unsupported color specification: {0:?}")]
    BadColor(String),
    /// The stylesheet could not be parsed.
    #[error("{0}")]
    Parse(String),
}
