//! Typed CSS values.
//!
//! Declaration values leave the parser as syntax tree nodes. [`Value`] is the
//! form the cascade works with: functions, URLs, `var()` references and
//! arithmetic keep their structure, everything else is a string.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Arg, Node, NodeKind};
use crate::serialize::serialize;

/// Nesting limit for `var()` substitution; deeper chains are cyclic.
const MAX_VAR_DEPTH: usize = 32;

/// A declaration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Keyword, number, dimension, color or quoted string.
    Str(String),
    /// `name(arguments)`
    Func(String, Vec<Value>),
    /// `url(...)` target, unquoted.
    Url(String),
    /// `var(--name)` with an optional fallback.
    Var(String, Option<Box<Value>>),
    /// Infix arithmetic; operands are folded to the left.
    Expr(String, Vec<Value>),
    /// Space separated values.
    Multi(Vec<Value>),
    /// Comma separated values.
    List(Vec<Value>),
}

impl Value {
    /// Convert a value syntax tree node.
    #[must_use]
    pub fn from_node(node: &Node) -> Self {
        match node.kind {
            NodeKind::Values => Self::from_values(&node.args),
            NodeKind::Value | NodeKind::Multivalue => {
                let mut parts: Vec<Self> = node.args.iter().map(Self::from_arg).collect();
                if parts.len() == 1 {
                    parts.remove(0)
                } else {
                    Self::Multi(parts)
                }
            }
            NodeKind::Function => Self::Func(
                node.text(0).unwrap_or_default().to_owned(),
                node.node(1)
                    .map(|arguments| arguments.args.iter().map(Self::from_arg).collect())
                    .unwrap_or_default(),
            ),
            NodeKind::Url => Self::Url(node.text(0).unwrap_or_default().to_owned()),
            NodeKind::Var => {
                let fallback = node
                    .node(1)
                    .map(|arguments| Box::new(Self::from_values(&arguments.args)));
                Self::Var(node.text(0).unwrap_or_default().to_owned(), fallback)
            }
            NodeKind::Expression => Self::from_expression(&node.args),
            NodeKind::NamedArgument => Self::Expr(
                "=".to_owned(),
                node.args.iter().map(Self::from_arg).collect(),
            ),
            NodeKind::Importance => Self::Str(format!("!{}", node.text(0).unwrap_or_default())),
            _ => Self::Str(serialize(node)),
        }
    }

    fn from_arg(arg: &Arg) -> Self {
        match arg {
            Arg::Text(text) => Self::Str(text.clone()),
            Arg::Node(node) => Self::from_node(node),
        }
    }

    fn from_values(args: &[Arg]) -> Self {
        let mut groups: Vec<Vec<Self>> = vec![Vec::new()];
        for arg in args {
            if arg.is_node(NodeKind::Separator) {
                groups.push(Vec::new());
            } else if let Some(group) = groups.last_mut() {
                group.push(Self::from_arg(arg));
            }
        }
        let mut groups: Vec<Self> = groups
            .into_iter()
            .map(|mut group| {
                if group.len() == 1 {
                    group.remove(0)
                } else {
                    Self::Multi(group)
                }
            })
            .collect();
        if groups.len() == 1 {
            groups.remove(0)
        } else {
            Self::List(groups)
        }
    }

    fn from_expression(args: &[Arg]) -> Self {
        let mut result: Option<Self> = None;
        let mut operator: Option<String> = None;
        for arg in args {
            if let Some(infix) = arg.as_node().filter(|n| n.kind == NodeKind::InfixOperator) {
                operator = infix.text(0).map(str::to_owned);
                continue;
            }
            let operand = Self::from_arg(arg);
            result = Some(match (result.take(), operator.take()) {
                (Some(lhs), Some(op)) => Self::Expr(op, vec![lhs, operand]),
                (Some(lhs), None) => Self::Multi(vec![lhs, operand]),
                // A leading sign, as in `-x`.
                (None, Some(op)) => Self::Expr(op, vec![operand]),
                (None, None) => operand,
            });
        }
        result.unwrap_or(Self::Multi(Vec::new()))
    }

    /// The string, if this is a plain value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is the keyword `keyword`, compared case-insensitively.
    #[must_use]
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.as_str().is_some_and(|text| text.eq_ignore_ascii_case(keyword))
    }

    /// Whether any `var()` reference remains.
    #[must_use]
    pub fn has_vars(&self) -> bool {
        match self {
            Self::Var(..) => true,
            Self::Str(_) | Self::Url(_) => false,
            Self::Func(_, args) | Self::Expr(_, args) | Self::Multi(args) | Self::List(args) => {
                args.iter().any(Self::has_vars)
            }
        }
    }

    /// Substitute `var()` references.
    ///
    /// A reference to an undefined property uses its fallback, or the empty
    /// string without one. Cyclic references evaluate to the empty string.
    #[must_use]
    pub fn evaluate(&self, vars: &HashMap<String, Self>) -> Self {
        self.evaluate_at(vars, 0)
    }

    fn evaluate_at(&self, vars: &HashMap<String, Self>, depth: usize) -> Self {
        if depth > MAX_VAR_DEPTH {
            return Self::Str(String::new());
        }
        let map = |args: &[Self]| args.iter().map(|a| a.evaluate_at(vars, depth)).collect();
        match self {
            Self::Var(name, fallback) => match (vars.get(name), fallback) {
                (Some(value), _) => value.evaluate_at(vars, depth + 1),
                (None, Some(fallback)) => fallback.evaluate_at(vars, depth + 1),
                (None, None) => Self::Str(String::new()),
            },
            Self::Str(_) | Self::Url(_) => self.clone(),
            Self::Func(name, args) => Self::Func(name.clone(), map(args)),
            Self::Expr(op, args) => Self::Expr(op.clone(), map(args)),
            Self::Multi(args) => Self::Multi(map(args)),
            Self::List(args) => Self::List(map(args)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, args: &[Value], separator: &str) -> fmt::Result {
            for (index, arg) in args.iter().enumerate() {
                if index > 0 {
                    f.write_str(separator)?;
                }
                write!(f, "{arg}")?;
            }
            Ok(())
        }

        match self {
            Self::Str(text) => f.write_str(text),
            Self::Func(name, args) => {
                write!(f, "{name}(")?;
                join(f, args, ", ")?;
                f.write_str(")")
            }
            Self::Url(url) => write!(f, "url({url})"),
            Self::Var(name, None) => write!(f, "var({name})"),
            Self::Var(name, Some(fallback)) => write!(f, "var({name}, {fallback})"),
            Self::Expr(op, args) if op == "=" => join(f, args, "="),
            Self::Expr(op, args) if args.len() == 1 => write!(f, "{op}{}", args[0]),
            Self::Expr(op, args) => join(f, args, &format!(" {op} ")),
            Self::Multi(args) => join(f, args, " "),
            Self::List(args) => join(f, args, ", "),
        }
    }
}

/// One declaration of a rule set.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name; custom properties keep their `--` prefix.
    pub name: String,
    /// Declared value.
    pub value: Value,
    /// Whether the declaration carries `!important`.
    pub important: bool,
}

impl Declaration {
    /// Convert a `rule` or `var-decl` node.
    #[must_use]
    pub fn from_rule(node: &Node) -> Option<Self> {
        if !matches!(node.kind, NodeKind::Rule | NodeKind::VarDecl) {
            return None;
        }
        let name = node.text(0)?.to_owned();
        let value = node.node(1).map_or(Value::Str(String::new()), Value::from_node);
        let important = node
            .node(2)
            .is_some_and(|importance| importance.kind == NodeKind::Importance);
        Some(Self {
            name,
            value,
            important,
        })
    }

    /// Declarations of a `rules` node, in source order.
    #[must_use]
    pub fn from_rules(rules: &Node) -> Vec<Self> {
        rules.nodes().filter_map(Self::from_rule).collect()
    }

    /// Whether this declares a custom property.
    #[must_use]
    pub fn is_custom_property(&self) -> bool {
        self.name.starts_with("--")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_inline_style;

    fn value_of(css: &str) -> Value {
        let declarations = parse_inline_style(&format!("x: {css}"));
        declarations[0].value.clone()
    }

    #[test]
    fn test_list_and_multi() {
        assert_eq!(
            value_of("1px solid red, blue"),
            Value::List(vec![
                Value::Multi(vec![
                    Value::Str("1px".into()),
                    Value::Str("solid".into()),
                    Value::Str("red".into()),
                ]),
                Value::Str("blue".into()),
            ])
        );
    }

    #[test]
    fn test_expression_folds_left() {
        let value = value_of("calc(1px + 2px - 3px)");
        assert_eq!(value.to_string(), "calc(1px + 2px - 3px)");
        let Value::Func(_, args) = value else {
            panic!("expected a function");
        };
        assert!(matches!(&args[0], Value::Expr(op, operands) if op == "-" && operands.len() == 2));
    }

    #[test]
    fn test_var_fallback_and_cycle() {
        let value = value_of("var(--a, var(--b, 3px))");
        let mut vars = HashMap::new();
        assert_eq!(value.evaluate(&vars), Value::Str("3px".into()));

        let _ = vars.insert("--b".to_owned(), Value::Str("4px".into()));
        assert_eq!(value.evaluate(&vars), Value::Str("4px".into()));

        let _ = vars.insert("--a".to_owned(), value_of("var(--a)"));
        assert_eq!(value.evaluate(&vars), Value::Str(String::new()));
    }
}
