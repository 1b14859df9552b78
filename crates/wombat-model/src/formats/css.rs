use super::{FormatDecoder, text};
use crate::document::{CssDocument, Document};
use crate::error::ModelError;

/// `text/css`. Parsing never fails; broken rules are dropped.
pub struct CssDecoder;

impl FormatDecoder for CssDecoder {
    fn name(&self) -> &'static str {
        "CSS"
    }

    fn accepts(&self, _data: &[u8], mime: &str) -> bool {
        mime == "text/css"
    }

    fn decode(&self, data: &[u8], _mime: &str) -> Result<Document, ModelError> {
        Ok(Document::Css(CssDocument::parse(&text(data))))
    }

    /// Syntax issues of the stylesheet, then selectors that were not
    /// understood.
    fn decode_with_issues(
        &self,
        data: &[u8],
        _mime: &str,
    ) -> Result<(Document, Vec<String>), ModelError> {
        let css = CssDocument::parse(&text(data));
        let mut issues = css.stylesheet.issues.clone();
        issues.extend(css.selector_warnings());
        Ok((Document::Css(css), issues))
    }
}
