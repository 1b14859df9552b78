use crate::ast::{Arg, Node, NodeKind};

/// Group a token stream by its brackets.
///
/// Returns a `stylesheet` node whose arguments are tokens and nested
/// `curly`/`brace`/`square` nodes, plus a message for every bracket that had
/// to be closed implicitly.
#[must_use]
pub fn build_structure<S: AsRef<str>>(tokens: &[S]) -> (Node, Vec<String>) {
    let mut issues = Vec::new();
    let mut fence: Vec<NodeKind> = Vec::new();
    let mut stack: Vec<Vec<Arg>> = Vec::new();
    let mut args: Vec<Arg> = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        let opened = match token {
            "{" => Some(NodeKind::Curly),
            "(" => Some(NodeKind::Brace),
            "[" => Some(NodeKind::Square),
            _ => None,
        };
        if let Some(kind) = opened {
            fence.push(kind);
            stack.push(std::mem::take(&mut args));
            continue;
        }

        let closed = match token {
            "}" => Some(NodeKind::Curly),
            ")" => Some(NodeKind::Brace),
            "]" => Some(NodeKind::Square),
            _ => None,
        };
        let Some(kind) = closed else {
            args.push(Arg::Text(token.to_owned()));
            continue;
        };

        // Closers with no matching opener are dropped.
        if !fence.contains(&kind) {
            continue;
        }
        while let Some(open) = fence.pop() {
            if open != kind {
                issues.push(format!("unclosed {open} before {token:?}"));
            }
            let node = Node::new(open, std::mem::take(&mut args));
            args = stack.pop().unwrap_or_default();
            args.push(Arg::Node(node));
            if open == kind {
                break;
            }
        }
    }

    while let Some(open) = fence.pop() {
        issues.push(format!("unclosed {open} at end of stylesheet"));
        let node = Node::new(open, std::mem::take(&mut args));
        args = stack.pop().unwrap_or_default();
        args.push(Arg::Node(node));
    }

    (Node::new(NodeKind::Stylesheet, args), issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    #[test]
    fn test_nested_brackets() {
        let (root, issues) = build_structure(&tokenize("a{b:c(d)}"));
        assert!(issues.is_empty());
        assert_eq!(
            root.to_string(),
            r#"stylesheet("a", curly("b", ":", "c", brace("d")))"#
        );
    }

    #[test]
    fn test_stray_closer_is_ignored() {
        let (root, issues) = build_structure(&tokenize("a)}"));
        assert!(issues.is_empty());
        assert_eq!(root.to_string(), r#"stylesheet("a")"#);
    }

    #[test]
    fn test_unclosed_block_is_closed_at_eof() {
        let (root, issues) = build_structure(&tokenize("a{b(c"));
        assert_eq!(issues.len(), 2);
        assert_eq!(
            root.to_string(),
            r#"stylesheet("a", curly("b", brace("c")))"#
        );
    }
}
