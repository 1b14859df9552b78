//! Stylesheet serializer.
//!
//! Turns a syntax tree produced by [`crate::parse_css`] back into CSS text.
//! Formatting is normalized (one statement per line, `; ` between
//! declarations) so that parsing the output yields the same tree.

use crate::ast::{Arg, Node, NodeKind};
use crate::parser::raw_text;

/// Serialize a syntax tree node to CSS text.
#[must_use]
pub fn serialize(node: &Node) -> String {
    let mut out = String::new();
    Serializer { out: &mut out }.node(node, false);
    out
}

struct Serializer<'a> {
    out: &'a mut String,
}

impl Serializer<'_> {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn arg(&mut self, arg: &Arg, nested: bool) {
        match arg {
            Arg::Text(text) => self.push(text),
            Arg::Node(node) => self.node(node, nested),
        }
    }

    fn joined(&mut self, args: &[Arg], separator: &str, nested: bool) {
        for (index, arg) in args.iter().enumerate() {
            if index > 0 {
                self.push(separator);
            }
            self.arg(arg, nested);
        }
    }

    /// `nested` is set inside function arguments, where infix operators are
    /// padded with spaces as `calc()` requires.
    #[allow(clippy::too_many_lines)]
    fn node(&mut self, node: &Node, nested: bool) {
        let args = &node.args;
        match node.kind {
            NodeKind::Stylesheet | NodeKind::Scope => self.joined(args, "\n", false),
            NodeKind::Style => {
                self.arg_at(node, 0);
                self.push(" {");
                self.arg_at(node, 1);
                self.push("}");
            }
            NodeKind::Rules => self.joined(args, "; ", false),
            NodeKind::Rule | NodeKind::VarDecl => {
                self.arg_at(node, 0);
                self.push(": ");
                self.arg_at(node, 1);
                if let Some(importance) = node.node(2) {
                    self.push(" ");
                    self.node(importance, false);
                }
            }
            NodeKind::Importance => {
                self.push("!");
                self.joined(args, "", false);
            }
            NodeKind::AtruleSimple => {
                self.at_rule_head(node);
                self.push(";");
            }
            NodeKind::AtruleStyle | NodeKind::AtruleBlock => {
                self.at_rule_head(node);
                self.push(" {");
                if node.kind == NodeKind::AtruleBlock {
                    self.push("\n");
                }
                self.arg_at(node, 2);
                if node.kind == NodeKind::AtruleBlock {
                    self.push("\n");
                }
                self.push("}");
            }
            NodeKind::Prelude => self.prelude(args),
            NodeKind::Values => {
                for (index, arg) in args.iter().enumerate() {
                    let separator = arg.is_node(NodeKind::Separator);
                    if index > 0 && !separator {
                        self.push(" ");
                    }
                    self.arg(arg, nested);
                }
            }
            NodeKind::Separator => self.push(","),
            NodeKind::Value => self.joined(args, "", nested),
            // Inside arguments spaces between parts are insignificant, at the
            // top level the parts were adjacent.
            NodeKind::Multivalue => self.joined(args, if nested { " " } else { "" }, nested),
            NodeKind::Expression => {
                let separator = if nested { " " } else { "" };
                self.joined(args, separator, nested);
            }
            NodeKind::Function => {
                self.arg_at(node, 0);
                self.push("(");
                if let Some(arguments) = node.node(1) {
                    self.node(arguments, true);
                }
                self.push(")");
            }
            NodeKind::Arguments => self.joined(args, ", ", true),
            NodeKind::NamedArgument => self.joined(args, "=", true),
            NodeKind::Url => {
                self.push("url(");
                self.joined(args, "", false);
                self.push(")");
            }
            NodeKind::Var => {
                self.push("var(");
                self.arg_at(node, 0);
                if let Some(fallback) = node.node(1) {
                    self.push(", ");
                    self.node(fallback, true);
                }
                self.push(")");
            }
            NodeKind::Selector => self.joined(args, ", ", false),
            NodeKind::SelectorSeq => {
                for arg in args {
                    match arg.as_node() {
                        Some(op) if op.kind == NodeKind::PathOperator => {
                            match op.text(0) {
                                Some(" ") | None => self.push(" "),
                                Some(combinator) => {
                                    self.push(" ");
                                    self.push(combinator);
                                    self.push(" ");
                                }
                            }
                        }
                        _ => self.arg(arg, false),
                    }
                }
            }
            NodeKind::InfixOperator
            | NodeKind::PathOperator
            | NodeKind::SelectorSingle
            | NodeKind::SelectorTag
            | NodeKind::Operator => self.joined(args, "", false),
            NodeKind::SelectorClass => {
                self.push(".");
                self.joined(args, "", false);
            }
            NodeKind::SelectorId => {
                self.push("#");
                self.joined(args, "", false);
            }
            NodeKind::SelectorAttrPresent => {
                self.push("[");
                self.joined(args, "", false);
                self.push("]");
            }
            NodeKind::SelectorAttr => {
                self.push("[");
                self.arg_at(node, 0);
                self.arg_at(node, 1);
                self.push("\"");
                if let Some(value) = node.text(2) {
                    self.push(&value.replace('\\', r"\\").replace('"', "\\\""));
                }
                self.push("\"]");
            }
            NodeKind::SelectorPseudoClass => {
                self.push(":");
                self.joined(args, "", false);
            }
            NodeKind::SelectorPseudoElement => {
                self.push("::");
                self.joined(args, "", false);
            }
            NodeKind::SelectorPseudoClassFn | NodeKind::SelectorPseudoElementFn => {
                self.push(if node.kind == NodeKind::SelectorPseudoClassFn { ":" } else { "::" });
                self.arg_at(node, 0);
                self.push("(");
                self.arg_at(node, 1);
                self.push(")");
            }
            NodeKind::SelectorFunctionArguments => {
                let selectors = args.iter().all(|a| a.is_node(NodeKind::SelectorSeq));
                self.joined(args, if selectors { ", " } else { "" }, false);
            }
            NodeKind::SelectorPercentage => {
                self.joined(args, "", false);
                self.push("%");
            }
            NodeKind::MediaTests => self.joined(args, ", ", false),
            NodeKind::MediaTest => self.joined(args, " and ", false),
            NodeKind::MediaType => self.joined(args, " ", false),
            NodeKind::MediaProperty | NodeKind::SupportsTest => {
                self.push("(");
                self.arg_at(node, 0);
                if node.args.len() > 1 {
                    self.push(": ");
                    self.arg_at(node, 1);
                }
                self.push(")");
            }
            NodeKind::Boolexpr => {
                for (index, arg) in args.iter().enumerate() {
                    if index > 0 {
                        self.push(" ");
                    }
                    match arg.as_node() {
                        Some(inner) if inner.kind == NodeKind::Boolexpr => {
                            self.push("(");
                            self.node(inner, false);
                            self.push(")");
                        }
                        _ => self.arg(arg, false),
                    }
                }
            }
            NodeKind::Curly | NodeKind::Brace | NodeKind::Square | NodeKind::Item => {
                self.push(&raw_text(std::slice::from_ref(&Arg::Node(node.clone()))));
            }
        }
    }

    fn arg_at(&mut self, node: &Node, index: usize) {
        if let Some(arg) = node.args.get(index) {
            self.arg(arg, false);
        }
    }

    fn at_rule_head(&mut self, node: &Node) {
        self.push("@");
        self.arg_at(node, 0);
        if let Some(prelude) = node.node(1).filter(|p| !p.args.is_empty()) {
            self.push(" ");
            self.node(prelude, false);
        }
    }

    fn prelude(&mut self, args: &[Arg]) {
        // Structured preludes hold nodes only; raw ones keep their tokens.
        if args.iter().all(|arg| arg.as_node().is_some()) {
            self.joined(args, " ", false);
        } else {
            self.push(&raw_text(args));
        }
    }
}
