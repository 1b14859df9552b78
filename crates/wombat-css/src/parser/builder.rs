//! Lowers the bracket tree into the typed stylesheet tree.
//!
//! Three passes: statements are split into `item`s, items are recognized as
//! style rules or at-rules, and declarations, values, selectors and preludes
//! are parsed into their own node kinds. A malformed statement is dropped
//! with an issue; the rest of the stylesheet is kept.

use std::mem;

use crate::ast::{Arg, Node, NodeKind};

/// At-rules whose block is a declaration list.
const STYLE_AT_RULES: [&str; 11] = [
    "font-face",
    "color-profile",
    "counter-style",
    "swash",
    "annotation",
    "ornaments",
    "stylistic",
    "styleset",
    "character-variant",
    "font-palette-values",
    "page",
];

/// At-rules whose block holds nested rules.
const BLOCK_AT_RULES: [&str; 5] = ["font-feature-values", "keyframes", "layer", "media", "supports"];

/// At-rules terminated by `;`.
const SIMPLE_AT_RULES: [&str; 3] = ["charset", "import", "namespace"];

/// Functional pseudo-classes whose argument is a selector list.
const SELECTOR_FUNCTIONS: [&str; 5] = ["is", "has", "with", "not", "where"];

/// Semantic builder state.
#[derive(Default)]
pub struct Builder {
    issues: Vec<String>,
}

impl Builder {
    /// Create a builder with no issues recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower a `stylesheet` bracket tree.
    #[must_use]
    pub fn build(mut self, structure: Node) -> (Node, Vec<String>) {
        let listed = build_lists(structure);
        let root = self.build_block(&listed, NodeKind::Stylesheet);
        (root, self.issues)
    }

    /// Lower the contents of a declaration block, e.g. a `style` attribute.
    #[must_use]
    pub fn build_declarations(mut self, structure: Node) -> (Node, Vec<String>) {
        let listed = build_list(structure);
        let rules = self.build_rules(&listed);
        (rules, self.issues)
    }

    fn issue(&mut self, message: impl Into<String>) {
        self.issues.push(message.into());
    }

    // ========== statements ==========

    fn build_block(&mut self, node: &Node, kind: NodeKind) -> Node {
        let mut children = Vec::new();

        for child in node.nodes() {
            if child.kind != NodeKind::Item {
                self.issue(format!("unexpected {} in rule list", child.kind));
                continue;
            }
            let args = &child.args;
            let Some(last) = args.last() else {
                continue;
            };
            if args.len() == 1 && last.is_text(";") {
                continue;
            }

            if args[0].is_text("@") {
                if let Some(rule) = self.build_at_rule(args) {
                    children.push(Arg::Node(rule));
                }
                continue;
            }

            match last.as_node() {
                Some(block) if block.kind == NodeKind::Curly => {
                    let selector = self.parse_selector(args[..args.len() - 1].to_vec());
                    let rules = self.build_rules(block);
                    children.push(Arg::Node(Node::new(
                        NodeKind::Style,
                        vec![selector.into(), rules.into()],
                    )));
                }
                _ => self.issue(format!("expected a block after {:?}", raw_text(args))),
            }
        }

        Node::new(kind, children)
    }

    fn build_at_rule(&mut self, args: &[Arg]) -> Option<Node> {
        let block = args
            .last()
            .and_then(Arg::as_node)
            .filter(|node| node.kind == NodeKind::Curly);
        let end = if block.is_some() || args.last().is_some_and(|a| a.is_text(";")) {
            args.len() - 1
        } else {
            args.len()
        };
        let mut prelude = args[1..end].to_vec();
        strip_space(&mut prelude);

        let Some(name) = prelude.first().and_then(Arg::as_text).map(str::to_owned) else {
            self.issue("at-rule without a name");
            return None;
        };

        let is_block_rule =
            BLOCK_AT_RULES.contains(&name.as_str()) || name.ends_with("-keyframes");
        let node = match block {
            Some(block) if STYLE_AT_RULES.contains(&name.as_str()) => Node::new(
                NodeKind::AtruleStyle,
                vec![
                    name.clone().into(),
                    self.parse_prelude(prelude).into(),
                    self.build_rules(block).into(),
                ],
            ),
            Some(block) if is_block_rule => Node::new(
                NodeKind::AtruleBlock,
                vec![
                    name.clone().into(),
                    self.parse_prelude(prelude).into(),
                    self.build_block(block, NodeKind::Scope).into(),
                ],
            ),
            None if SIMPLE_AT_RULES.contains(&name.as_str()) || is_block_rule => Node::new(
                NodeKind::AtruleSimple,
                vec![name.clone().into(), self.parse_prelude(prelude).into()],
            ),
            _ => {
                self.issue(format!("unsupported at-rule @{name}"));
                return None;
            }
        };
        Some(node)
    }

    fn build_rules(&mut self, block: &Node) -> Node {
        let mut children = Vec::new();

        for child in block.nodes() {
            if child.kind != NodeKind::Item {
                continue;
            }
            let args = &child.args;
            if args.len() == 1 && args[0].is_text(";") {
                continue;
            }
            if args.last().is_some_and(|a| a.is_node(NodeKind::Curly)) {
                self.issue(format!("nested rule {:?} is not supported", raw_text(args)));
                continue;
            }
            let Some(colon) = args.iter().position(|a| a.is_text(":")) else {
                self.issue(format!("declaration without a colon: {:?}", raw_text(args)));
                continue;
            };

            let mut names = args[..colon].iter().filter(|a| !a.is_text(" "));
            let Some(name) = names.next().and_then(Arg::as_text).map(str::to_owned) else {
                self.issue("declaration without a name");
                continue;
            };
            if names.next().is_some() {
                self.issue(format!("junk before the colon of {name}"));
            }

            let end = if args.last().is_some_and(|a| a.is_text(";")) {
                args.len() - 1
            } else {
                args.len()
            };
            let value = self.parse_values(args[colon + 1..end].to_vec());

            let rule = if name.starts_with("--") {
                Node::new(NodeKind::VarDecl, vec![name.into(), value.into()])
            } else if value.args.last().is_some_and(|a| a.is_node(NodeKind::Importance)) {
                let mut values = value.args;
                let importance = values.pop().unwrap_or_else(|| Arg::Text(String::new()));
                Node::new(
                    NodeKind::Rule,
                    vec![
                        name.into(),
                        Node::new(NodeKind::Values, values).into(),
                        importance,
                    ],
                )
            } else {
                Node::new(NodeKind::Rule, vec![name.into(), value.into()])
            };
            children.push(Arg::Node(rule));
        }

        Node::new(NodeKind::Rules, children)
    }

    // ========== values ==========

    fn parse_values(&mut self, mut tokens: Vec<Arg>) -> Node {
        strip_space(&mut tokens);
        let mut result = Vec::new();
        let mut sequence = Vec::new();

        for token in tokens {
            let boundary = matches!(token.as_text(), Some(" " | "," | "!"));
            if !boundary {
                sequence.push(token);
                continue;
            }
            if !sequence.is_empty() {
                result.push(Arg::Node(self.parse_expression(mem::take(&mut sequence))));
            }
            match token.as_text() {
                Some("!") => sequence.push(token),
                Some(",") => result.push(Arg::Node(Node::new(
                    NodeKind::Separator,
                    vec![",".into()],
                ))),
                _ => {}
            }
        }
        if !sequence.is_empty() {
            result.push(Arg::Node(self.parse_expression(sequence)));
        }

        Node::new(NodeKind::Values, result)
    }

    fn parse_expression(&mut self, mut tokens: Vec<Arg>) -> Node {
        strip_space(&mut tokens);
        let mut operator = false;
        let mut result: Vec<Arg> = Vec::new();
        let mut pending: Vec<Arg> = Vec::new();

        for token in tokens {
            match &token {
                Arg::Text(text) if text == " " => {}
                Arg::Text(text) if matches!(text.as_str(), "+" | "-" | "*" | "/") => {
                    if !pending.is_empty() {
                        result.push(Arg::Node(self.parse_expression(mem::take(&mut pending))));
                    }
                    result.push(Arg::Node(Node::new(
                        NodeKind::InfixOperator,
                        vec![text.clone().into()],
                    )));
                    operator = true;
                }
                // A number followed by its unit, or `#` followed by hex digits.
                Arg::Text(text) if pending.last().and_then(Arg::as_text).is_some_and(glues) => {
                    if let Some(Arg::Text(last)) = pending.last_mut() {
                        last.push_str(text);
                    }
                }
                Arg::Node(brace)
                    if brace.kind == NodeKind::Brace
                        && pending.last().and_then(Arg::as_text).is_some() =>
                {
                    if let Some(Arg::Text(name)) = pending.pop() {
                        result.push(Arg::Node(self.parse_call(&name, brace)));
                    }
                }
                _ => pending.push(token),
            }
        }

        if result.is_empty() {
            result = pending;
        } else if !pending.is_empty() {
            result.push(Arg::Node(self.parse_expression(pending)));
        }

        if operator {
            return Node::new(NodeKind::Expression, result);
        }
        if result.len() == 1 && result[0].is_node(NodeKind::Brace) {
            let Some(Arg::Node(brace)) = result.pop() else {
                return Node::new(NodeKind::Multivalue, Vec::new());
            };
            return self.parse_expression(brace.args);
        }
        if result.len() == 2 && result[0].is_text("!") {
            let keyword = result.swap_remove(1);
            return Node::new(NodeKind::Importance, vec![keyword]);
        }
        if result.len() == 1 {
            Node::new(NodeKind::Value, result)
        } else {
            Node::new(NodeKind::Multivalue, result)
        }
    }

    fn parse_call(&mut self, name: &str, brace: &Node) -> Node {
        match name {
            "var" => {
                let mut inner = brace.args.clone();
                match inner.iter().position(|a| a.is_text(",")) {
                    Some(comma) => {
                        let fallback = inner.split_off(comma + 1);
                        let _ = inner.pop();
                        strip_space(&mut inner);
                        if inner.len() != 1 {
                            self.issue(format!("malformed var(): {:?}", raw_text(&brace.args)));
                        }
                        inner.truncate(1);
                        inner.push(Arg::Node(self.parse_arguments(fallback)));
                        Node::new(NodeKind::Var, inner)
                    }
                    None => {
                        strip_space(&mut inner);
                        Node::new(NodeKind::Var, inner)
                    }
                }
            }
            "url" => Node::new(
                NodeKind::Url,
                vec![remove_optional_quotes(raw_text(&brace.args).trim()).into()],
            ),
            _ => Node::new(
                NodeKind::Function,
                vec![name.into(), self.parse_arguments(brace.args.clone()).into()],
            ),
        }
    }

    fn parse_arguments(&mut self, tokens: Vec<Arg>) -> Node {
        let mut result = Vec::new();
        let mut current = Vec::new();
        for token in tokens {
            if token.is_text(",") {
                result.push(self.parse_expression(mem::take(&mut current)));
            } else {
                current.push(token);
            }
        }
        if !current.is_empty() {
            result.push(self.parse_expression(current));
        }

        let arguments = result.into_iter().map(named_argument).map(Arg::Node).collect();
        Node::new(NodeKind::Arguments, arguments)
    }

    // ========== preludes ==========

    fn parse_prelude(&mut self, mut tokens: Vec<Arg>) -> Node {
        let name = tokens.remove(0);
        strip_space(&mut tokens);

        let result = match name.as_text() {
            Some("media") => vec![Arg::Node(parse_media_prelude(tokens))],
            Some("import" | "namespace") => self.parse_values(tokens).args,
            Some("charset") => tokens
                .into_iter()
                .next()
                .map(|first| vec![Arg::Node(self.parse_expression(vec![first]))])
                .unwrap_or_default(),
            Some("supports") => vec![Arg::Node(parse_supports_prelude(&tokens))],
            _ => tokens,
        };

        Node::new(NodeKind::Prelude, result)
    }

    // ========== selectors ==========

    fn parse_selector(&mut self, tokens: Vec<Arg>) -> Node {
        let mut result = Vec::new();
        for mut alternative in split_on(tokens, ",") {
            strip_space(&mut alternative);
            if alternative.is_empty() {
                self.issue("empty selector in list");
                continue;
            }
            result.push(Arg::Node(self.parse_selector_seq(alternative)));
        }
        Node::new(NodeKind::Selector, result)
    }

    /// [Selectors § 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
    fn parse_selector_seq(&mut self, mut tokens: Vec<Arg>) -> Node {
        strip_space(&mut tokens);
        let mut result: Vec<Arg> = Vec::new();
        let mut compound: Vec<Arg> = Vec::new();

        for token in tokens {
            match token.as_text() {
                Some(combinator @ (">" | "~" | "+")) => {
                    let combinator = combinator.to_owned();
                    if !compound.is_empty() {
                        result.push(Arg::Node(self.parse_selector_single(mem::take(&mut compound))));
                    }
                    let operator = Arg::Node(Node::new(NodeKind::PathOperator, vec![combinator.into()]));
                    // `a > b` tokenizes as `a`, ` `, `>`: the space was not a combinator.
                    match result.last_mut() {
                        Some(last) if last.as_node().is_some_and(|n| n.kind == NodeKind::PathOperator && n.text(0) == Some(" ")) => {
                            *last = operator;
                        }
                        _ => result.push(operator),
                    }
                }
                Some(" ") => {
                    if !compound.is_empty() {
                        result.push(Arg::Node(self.parse_selector_single(mem::take(&mut compound))));
                    }
                    if result.last().is_some_and(|last| !last.is_node(NodeKind::PathOperator)) {
                        result.push(Arg::Node(Node::new(NodeKind::PathOperator, vec![" ".into()])));
                    }
                }
                _ => compound.push(token),
            }
        }
        if !compound.is_empty() {
            result.push(Arg::Node(self.parse_selector_single(compound)));
        }

        Node::new(NodeKind::SelectorSeq, result)
    }

    /// [Selectors § 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
    fn parse_selector_single(&mut self, tokens: Vec<Arg>) -> Node {
        let mut result: Vec<Node> = Vec::new();
        // The last two tokens; `None` stands for a bracket node.
        let mut past: Vec<Option<String>> = Vec::new();

        for token in tokens {
            let text = token.as_text().map(str::to_owned);
            let previous = past.last().cloned().flatten();
            let before_previous = past.len().checked_sub(2).and_then(|i| past[i].clone());

            match (&token, text.as_deref()) {
                (_, Some("#" | "." | ":")) => {}
                (Arg::Node(brace), _) if brace.kind == NodeKind::Brace => {
                    let replaced = match result.last() {
                        Some(last) if last.kind == NodeKind::SelectorPseudoClass => {
                            let name = last.text(0).unwrap_or_default().to_owned();
                            let arguments = self.parse_selector_function_args(&name, brace.args.clone());
                            Some(Node::new(
                                NodeKind::SelectorPseudoClassFn,
                                vec![name.into(), arguments.into()],
                            ))
                        }
                        Some(last) if last.kind == NodeKind::SelectorPseudoElement => {
                            let name = last.text(0).unwrap_or_default().to_owned();
                            let mut arguments = brace.args.clone();
                            arguments.retain(|a| !a.is_text(" "));
                            Some(Node::new(
                                NodeKind::SelectorPseudoElementFn,
                                vec![
                                    name.into(),
                                    Node::new(NodeKind::SelectorFunctionArguments, arguments).into(),
                                ],
                            ))
                        }
                        _ => None,
                    };
                    match replaced {
                        Some(node) => {
                            let _ = result.pop();
                            result.push(node);
                        }
                        None => self.issue("parenthesis in selector without a function"),
                    }
                }
                (Arg::Node(square), _) if square.kind == NodeKind::Square => {
                    if let Some(node) = self.parse_attribute_selector(square) {
                        result.push(node);
                    }
                }
                (_, Some(text)) if past.is_empty() => {
                    result.push(Node::new(NodeKind::SelectorTag, vec![text.into()]));
                }
                (_, Some("*")) => self.issue("misplaced universal selector"),
                (_, Some("%")) => {
                    let after_name = previous.as_deref().is_some_and(|p| !matches!(p, "#" | "." | ":"));
                    match result.last_mut() {
                        Some(last) if after_name && last.kind == NodeKind::SelectorTag => {
                            last.kind = NodeKind::SelectorPercentage;
                        }
                        _ => self.issue("misplaced percentage in selector"),
                    }
                }
                (_, Some(text)) => match (before_previous.as_deref(), previous.as_deref()) {
                    (_, Some(".")) => result.push(Node::new(NodeKind::SelectorClass, vec![text.into()])),
                    (_, Some("#")) => result.push(Node::new(NodeKind::SelectorId, vec![text.into()])),
                    (Some(":"), Some(":")) => {
                        result.push(Node::new(NodeKind::SelectorPseudoElement, vec![text.into()]));
                    }
                    (_, Some(":")) => {
                        result.push(Node::new(NodeKind::SelectorPseudoClass, vec![text.into()]));
                    }
                    _ => self.issue(format!("unexpected {text:?} in selector")),
                },
                (Arg::Node(node), None) => self.issue(format!("unexpected {} in selector", node.kind)),
                (Arg::Text(_), None) => {}
            }

            past.push(text);
            if past.len() > 2 {
                let _ = past.remove(0);
            }
        }

        Node::new(NodeKind::SelectorSingle, result.into_iter().map(Arg::Node).collect())
    }

    fn parse_selector_function_args(&mut self, name: &str, tokens: Vec<Arg>) -> Node {
        if SELECTOR_FUNCTIONS.contains(&name) {
            let list = self.parse_selector(tokens);
            return Node::new(NodeKind::SelectorFunctionArguments, list.args);
        }
        let mut tokens = tokens;
        tokens.retain(|a| !a.is_text(" "));
        Node::new(NodeKind::SelectorFunctionArguments, tokens)
    }

    /// [Selectors § 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
    fn parse_attribute_selector(&mut self, square: &Node) -> Option<Node> {
        let tokens: Vec<&Arg> = square.args.iter().filter(|a| !a.is_text(" ")).collect();
        match tokens.as_slice() {
            [name] => Some(Node::new(NodeKind::SelectorAttrPresent, vec![(*name).clone()])),
            [name, operator @ .., value] if !operator.is_empty() => {
                let operator: String = operator.iter().filter_map(|a| a.as_text()).collect();
                let value = remove_optional_quotes(&raw_text(std::slice::from_ref(*value)));
                Some(Node::new(
                    NodeKind::SelectorAttr,
                    vec![(*name).clone(), operator.into(), value.into()],
                ))
            }
            _ => {
                self.issue(format!("malformed attribute selector [{}]", raw_text(&square.args)));
                None
            }
        }
    }
}

// ========== helpers ==========

/// Split the children of `stylesheet` and every `curly` block into `item`s.
fn build_lists(node: Node) -> Node {
    if !matches!(node.kind, NodeKind::Stylesheet | NodeKind::Curly) {
        return node;
    }
    let args = node
        .args
        .into_iter()
        .map(|arg| match arg {
            Arg::Node(child) => Arg::Node(build_lists(child)),
            text @ Arg::Text(_) => text,
        })
        .collect();
    build_list(Node::new(node.kind, args))
}

fn build_list(node: Node) -> Node {
    let mut series = Vec::new();
    let mut current = Vec::new();
    for arg in node.args {
        let terminates = arg.is_text(";") || arg.is_node(NodeKind::Curly);
        current.push(arg);
        if terminates {
            strip_space(&mut current);
            if !current.is_empty() {
                series.push(Arg::Node(Node::new(NodeKind::Item, mem::take(&mut current))));
            }
        }
    }
    strip_space(&mut current);
    if !current.is_empty() {
        series.push(Arg::Node(Node::new(NodeKind::Item, current)));
    }
    Node::new(node.kind, series)
}

/// Trim space tokens at both ends and collapse runs of them.
fn strip_space(tokens: &mut Vec<Arg>) {
    let mut previous_space = true;
    tokens.retain(|token| {
        let space = token.is_text(" ");
        let keep = !(space && previous_space);
        previous_space = space;
        keep
    });
    if tokens.last().is_some_and(|t| t.is_text(" ")) {
        let _ = tokens.pop();
    }
}

fn split_on(tokens: Vec<Arg>, separator: &str) -> Vec<Vec<Arg>> {
    let mut parts = vec![Vec::new()];
    for token in tokens {
        if token.is_text(separator) {
            parts.push(Vec::new());
        } else if let Some(part) = parts.last_mut() {
            part.push(token);
        }
    }
    parts
}

/// `name=value` inside function arguments, as in legacy `alpha(opacity=50)`.
fn named_argument(argument: Node) -> Node {
    let named = argument.kind == NodeKind::Multivalue
        && argument.args.len() >= 3
        && argument.args[1].is_text("=");
    if !named {
        return argument;
    }
    let mut args = argument.args;
    let rest = args.split_off(2);
    let name = args.swap_remove(0);
    let value = if rest.len() == 1 {
        Node::new(NodeKind::Value, rest)
    } else {
        Node::new(NodeKind::Multivalue, rest)
    };
    Node::new(NodeKind::NamedArgument, vec![name, value.into()])
}

/// Whether a token is glued to the one that follows it.
fn glues(previous: &str) -> bool {
    previous
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_digit() || c == '.' || c == '#')
}

/// Strip the quotes of a string token and drop its escaping backslashes.
fn remove_optional_quotes(text: &str) -> String {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            let mut out = String::with_capacity(text.len() - 2);
            let mut chars = text[1..text.len() - 1].chars();
            while let Some(c) = chars.next() {
                match c {
                    '\\' => out.extend(chars.next()),
                    _ => out.push(c),
                }
            }
            return out;
        }
    }
    text.to_owned()
}

/// Source text of a token list, brackets restored.
pub(crate) fn raw_text(args: &[Arg]) -> String {
    let mut out = String::new();
    for arg in args {
        match arg {
            Arg::Text(text) => out.push_str(text),
            Arg::Node(node) => {
                let (open, close) = match node.kind {
                    NodeKind::Curly => ("{", "}"),
                    NodeKind::Square => ("[", "]"),
                    _ => ("(", ")"),
                };
                out.push_str(open);
                out.push_str(&raw_text(&node.args));
                out.push_str(close);
            }
        }
    }
    out
}

fn parse_media_prelude(tokens: Vec<Arg>) -> Node {
    let mut queries = Vec::new();
    for mut query in split_on(tokens, ",") {
        strip_space(&mut query);
        if !query.is_empty() {
            queries.push(parse_media_query(query));
        }
    }
    if queries.len() == 1 {
        queries.remove(0)
    } else {
        Node::new(NodeKind::MediaTests, queries.into_iter().map(Arg::Node).collect())
    }
}

fn parse_media_query(tokens: Vec<Arg>) -> Node {
    let mut result = Vec::new();
    for mut condition in split_on(tokens, "and") {
        strip_space(&mut condition);
        if condition.is_empty() {
            continue;
        }
        match condition.first().and_then(Arg::as_node) {
            Some(brace) if brace.kind == NodeKind::Brace => {
                result.push(Arg::Node(media_property(brace)));
            }
            _ => {
                let types = condition.into_iter().filter(|a| !a.is_text(" ")).collect();
                result.push(Arg::Node(Node::new(NodeKind::MediaType, types)));
            }
        }
    }
    Node::new(NodeKind::MediaTest, result)
}

fn media_property(brace: &Node) -> Node {
    let (name, value) = name_value(&brace.args);
    let mut args = vec![Arg::Text(name)];
    if let Some(value) = value {
        args.push(Arg::Text(value));
    }
    Node::new(NodeKind::MediaProperty, args)
}

fn name_value(args: &[Arg]) -> (String, Option<String>) {
    match args.iter().position(|a| a.is_text(":")) {
        Some(colon) => (
            raw_text(&args[..colon]).trim().to_owned(),
            Some(raw_text(&args[colon + 1..]).trim().to_owned()),
        ),
        None => (raw_text(args).trim().to_owned(), None),
    }
}

/// [CSS Conditional § 6.1](https://www.w3.org/TR/css-conditional-3/#at-supports)
fn parse_supports_prelude(tokens: &[Arg]) -> Node {
    let has_groups = tokens.iter().any(|a| a.is_node(NodeKind::Brace));
    if !has_groups && tokens.iter().any(|a| a.is_text(":")) {
        let (name, value) = name_value(tokens);
        return Node::new(
            NodeKind::SupportsTest,
            vec![name.into(), value.unwrap_or_default().into()],
        );
    }

    let mut result = Vec::new();
    for token in tokens {
        match token {
            Arg::Text(text) if text.trim().is_empty() => {}
            Arg::Node(brace) if brace.kind == NodeKind::Brace => {
                result.push(Arg::Node(parse_supports_prelude(&brace.args)));
            }
            other => result.push(Arg::Node(Node::new(NodeKind::Operator, vec![other.clone()]))),
        }
    }
    Node::new(NodeKind::Boolexpr, result)
}
