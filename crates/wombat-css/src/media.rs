//! [Media Queries Level 4](https://www.w3.org/TR/mediaqueries-4/)

use serde::Deserialize;

use crate::ast::{Arg, Node, NodeKind};
use crate::selector::MatchContext;
use crate::units::units;

/// Font size assumed by `em` lengths in media features.
const MEDIA_EM_SIZE: f64 = 16.0;

/// The device a document is laid out for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaEnvironment {
    /// Media type, e.g. `screen` or `print`.
    pub media_type: String,
    /// Viewport width in pixels.
    pub width: f64,
    /// Viewport height in pixels.
    pub height: f64,
    /// Device resolution.
    pub dpi: f64,
    /// `light` or `dark`.
    pub color_scheme: String,
}

impl Default for MediaEnvironment {
    fn default() -> Self {
        Self {
            media_type: "screen".to_owned(),
            width: 1024.0,
            height: 768.0,
            dpi: 96.0,
            color_scheme: "light".to_owned(),
        }
    }
}

impl MediaEnvironment {
    /// Whether an `@media` prelude applies.
    ///
    /// An empty prelude always applies; a list of queries applies when any
    /// of them does. Unknown features never match.
    #[must_use]
    pub fn matches(&self, prelude: &Node) -> bool {
        match prelude.kind {
            NodeKind::Prelude => {
                let mut queries = prelude.nodes().peekable();
                queries.peek().is_none() || queries.any(|query| self.matches(query))
            }
            NodeKind::MediaTests => prelude.nodes().any(|query| self.matches(query)),
            NodeKind::MediaTest => self.query_matches(prelude),
            _ => false,
        }
    }

    /// [§ 3 Syntax](https://www.w3.org/TR/mediaqueries-4/#mq-syntax)
    ///
    /// "The `not` keyword, when present, negates the result of the media
    /// query"; `only` has no effect.
    fn query_matches(&self, query: &Node) -> bool {
        let mut negated = false;
        let mut result = true;
        for condition in query.nodes() {
            match condition.kind {
                NodeKind::MediaType => {
                    for keyword in condition.args.iter().filter_map(Arg::as_text) {
                        match keyword.to_ascii_lowercase().as_str() {
                            "not" => negated = true,
                            "only" | "all" => {}
                            media_type => result &= media_type == self.media_type,
                        }
                    }
                }
                NodeKind::MediaProperty => {
                    result &= self.feature_matches(
                        &condition.text(0).unwrap_or_default().to_ascii_lowercase(),
                        condition.text(1),
                    );
                }
                _ => result = false,
            }
        }
        result != negated
    }

    /// [§ 4 Media Features](https://www.w3.org/TR/mediaqueries-4/#mq-features)
    fn feature_matches(&self, name: &str, value: Option<&str>) -> bool {
        let length = |value: &str| units(value, self.dpi, None, 0.0, Some(MEDIA_EM_SIZE)).ok();
        let resolution = |value: &str| {
            let value = value.trim();
            if let Some(dppx) = value.strip_suffix("dppx").or_else(|| value.strip_suffix('x')) {
                dppx.trim().parse::<f64>().ok()
            } else {
                value.strip_suffix("dpi")?.trim().parse::<f64>().ok().map(|dpi| dpi / 96.0)
            }
        };
        let device_resolution = self.dpi / 96.0;

        let Some(value) = value else {
            return matches!(name, "color" | "width" | "height" | "orientation");
        };
        match name {
            "width" => length(value).is_some_and(|v| (self.width - v).abs() < f64::EPSILON),
            "min-width" => length(value).is_some_and(|v| self.width >= v),
            "max-width" => length(value).is_some_and(|v| self.width <= v),
            "height" => length(value).is_some_and(|v| (self.height - v).abs() < f64::EPSILON),
            "min-height" => length(value).is_some_and(|v| self.height >= v),
            "max-height" => length(value).is_some_and(|v| self.height <= v),
            "orientation" => {
                let portrait = self.height >= self.width;
                match value.trim() {
                    "portrait" => portrait,
                    "landscape" => !portrait,
                    _ => false,
                }
            }
            "min-resolution" => resolution(value).is_some_and(|v| device_resolution >= v),
            "max-resolution" => resolution(value).is_some_and(|v| device_resolution <= v),
            "prefers-color-scheme" => value.trim().eq_ignore_ascii_case(&self.color_scheme),
            _ => false,
        }
    }
}

impl MatchContext for MediaEnvironment {
    fn media_matches(&self, prelude: &Node) -> bool {
        self.matches(prelude)
    }
}
