//! Integration tests for the CSS tokenizer.

use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use wombat_css::{CssTokenizer, detokenize, tokenize};

// ========== tokens ==========

#[test]
fn test_identifiers_and_punctuation() {
    assert_eq!(
        tokenize("a.nav>li:hover{}"),
        ["a", ".", "nav", ">", "li", ":", "hover", "{", "}"]
    );
}

#[test]
fn test_numbers_split_from_units() {
    assert_eq!(tokenize("12px 1.5em"), ["12", "px", " ", "1.5", "em"]);
}

#[test]
fn test_custom_property_names() {
    assert_eq!(tokenize("--main-color:red"), ["--main-color", ":", "red"]);
    assert_eq!(tokenize("var(--x)"), ["var", "(", "--x", ")"]);
}

#[test]
fn test_hash_is_followed_by_its_name() {
    assert_eq!(tokenize("#fff #main"), ["#", "fff", " ", "#", "main"]);
}

#[test]
fn test_whitespace_runs_collapse() {
    assert_eq!(tokenize("a \n\t b"), ["a", " ", "b"]);
    assert_eq!(tokenize("  a"), [" ", "a"]);
}

#[test]
fn test_comments_are_dropped() {
    assert_eq!(tokenize("a/* note */b"), ["a", "b"]);
    assert_eq!(tokenize("<!-- a -->b"), ["b"]);
    assert_eq!(tokenize("a /* unterminated"), ["a", " "]);
}

// ========== strings ==========

#[test]
fn test_strings_keep_their_quotes() {
    assert_eq!(tokenize(r#""a b" 'c d'"#), [r#""a b""#, " ", "'c d'"]);
}

#[test]
fn test_string_escapes() {
    assert_eq!(tokenize(r#""\41 B""#), [r#""AB""#]);
    assert_eq!(tokenize(r"'it\'s'"), [r"'it\'s'"]);
}

#[test]
fn test_escaped_quote_stays_inside_string() {
    let tokens = tokenize(r#"content:"a\"b\\";"#);
    assert_eq!(tokens, ["content", ":", r#""a\"b\\""#, ";"]);
    assert_eq!(tokenize(&detokenize(&tokens)), tokens);
    assert_eq!(tokenize(r#""\22 ""#), [r#""\"""#]);
}

#[test]
fn test_tokenizer_struct() {
    let mut tokenizer = CssTokenizer::new("a{b:c}");
    tokenizer.run();
    assert_eq!(tokenizer.tokens().len(), 6);
    assert_eq!(detokenize(tokenizer.tokens()), "a{b:c}");
}

// ========== round trip ==========

/// CSS-like text without comments, strings or `-`.
#[derive(Debug, Clone)]
struct PlainCss(String);

impl Arbitrary for PlainCss {
    fn arbitrary(g: &mut Gen) -> Self {
        const ALPHABET: &[char] = &[
            'a', 'b', 'z', '_', '0', '7', '.', ' ', '\n', '\t', '{', '}', ':', ';', '#', '(', ')',
            ',', '>', '+', '%',
        ];
        let len = usize::arbitrary(g) % 40;
        Self(
            (0..len)
                .map(|_| *g.choose(ALPHABET).unwrap_or(&'a'))
                .collect(),
        )
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars() {
        if c.is_whitespace() {
            if !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[quickcheck]
fn prop_detokenize_restores_text(input: PlainCss) -> bool {
    detokenize(&tokenize(&input.0)) == collapse_whitespace(&input.0)
}

/// Quoted strings holding escaped quotes and backslashes.
#[derive(Debug, Clone)]
struct QuotedCss(String);

impl Arbitrary for QuotedCss {
    fn arbitrary(g: &mut Gen) -> Self {
        const DOUBLE: &[&str] = &["a", " ", "'", r#"\""#, r"\\", "x;"];
        const SINGLE: &[&str] = &["b", " ", "\"", r"\'", r"\\", "}"];
        let mut text = String::new();
        for _ in 0..usize::arbitrary(g) % 6 {
            let (quote, pieces) = if bool::arbitrary(g) {
                ('"', DOUBLE)
            } else {
                ('\'', SINGLE)
            };
            text.push(quote);
            for _ in 0..usize::arbitrary(g) % 8 {
                text.push_str(g.choose(pieces).unwrap_or(&"a"));
            }
            text.push(quote);
            text.push(':');
        }
        Self(text)
    }
}

#[quickcheck]
fn prop_quoted_strings_survive_detokenize(input: QuotedCss) -> bool {
    let tokens = tokenize(&input.0);
    detokenize(&tokens) == input.0 && tokenize(&detokenize(&tokens)) == tokens
}
