//! Integration tests for the XML / tag-soup tokenizer.

use wombat_xml::{Attribute, Mode, Token, XmlTokenizer};

fn tokenize(input: &str, mode: Mode) -> Vec<Token> {
    let mut tokenizer = XmlTokenizer::new(input, mode);
    tokenizer.run();
    tokenizer.into_tokens()
}

fn start(name: &str, attributes: &[(&str, &str)], self_closing: bool) -> Token {
    Token::StartTag {
        name: name.to_owned(),
        attributes: attributes
            .iter()
            .map(|(n, v)| Attribute::new((*n).to_owned(), (*v).to_owned()))
            .collect(),
        self_closing,
    }
}

// ========== XML ==========

#[test]
fn test_element_with_text() {
    let tokens = tokenize("<a x='1' y=\"2\">hi</a>", Mode::Xml);
    assert_eq!(
        tokens,
        vec![
            start("a", &[("x", "1"), ("y", "2")], false),
            Token::Text("hi".to_owned()),
            Token::EndTag {
                name: "a".to_owned()
            },
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_empty_element_tag() {
    let tokens = tokenize("<svg:rect width='3'/>", Mode::Xml);
    assert_eq!(tokens[0], start("svg:rect", &[("width", "3")], true));
}

#[test]
fn test_comment_cdata_and_pi() {
    let tokens = tokenize(
        "<?xml-stylesheet href='a.css'?><!-- note --><![CDATA[<b>&amp;]]>",
        Mode::Xml,
    );
    assert_eq!(
        tokens,
        vec![
            Token::ProcessingInstruction {
                target: "xml-stylesheet".to_owned(),
                data: "href='a.css'".to_owned(),
            },
            Token::Comment(" note ".to_owned()),
            Token::Text("<b>&amp;".to_owned()),
            Token::EndOfFile,
        ]
    );
}

#[test]
fn test_doctype_with_internal_subset() {
    let tokens = tokenize(
        "<!DOCTYPE svg [ <!ENTITY a \"b\"> ]><svg/>",
        Mode::Xml,
    );
    assert!(matches!(tokens[0], Token::Doctype(_)));
    assert_eq!(tokens[1], start("svg", &[], true));
}

#[test]
fn test_references_in_text_and_attributes() {
    let tokens = tokenize("<t v='&lt;&#x41;'>&amp;&#66;</t>", Mode::Xml);
    assert_eq!(tokens[0], start("t", &[("v", "<A")], false));
    assert_eq!(tokens[1], Token::Text("&B".to_owned()));
}

#[test]
fn test_unquoted_attribute_is_an_error_in_xml() {
    let mut tokenizer = XmlTokenizer::new("<a x=1/>", Mode::Xml);
    tokenizer.run();
    assert!(tokenizer.issues().iter().any(|issue| issue.is_error));
}

// ========== tag soup ==========

#[test]
fn test_tag_soup_folds_case_and_accepts_bare_attributes() {
    let tokens = tokenize("<INPUT Disabled value=x>", Mode::TagSoup);
    assert_eq!(
        tokens[0],
        start("input", &[("disabled", ""), ("value", "x")], false)
    );
}

#[test]
fn test_tag_soup_issues_are_not_errors() {
    let mut tokenizer = XmlTokenizer::new("<p a=1 a=2>&bogus;", Mode::TagSoup);
    tokenizer.run();
    assert!(!tokenizer.issues().is_empty());
    assert!(tokenizer.issues().iter().all(|issue| !issue.is_error));
}

#[test]
fn test_script_content_is_raw_text() {
    let tokens = tokenize("<script>if (a < b && c) {}</script>", Mode::TagSoup);
    assert_eq!(tokens[1], Token::Text("if (a < b && c) {}".to_owned()));
    assert_eq!(
        tokens[2],
        Token::EndTag {
            name: "script".to_owned()
        }
    );
}

#[test]
fn test_title_decodes_references_but_not_tags() {
    let tokens = tokenize("<title>a <b> &amp; c</title>", Mode::TagSoup);
    assert_eq!(tokens[1], Token::Text("a <b> & c".to_owned()));
}

#[test]
fn test_lone_less_than_is_text_in_tag_soup() {
    let tokens = tokenize("1 < 2", Mode::TagSoup);
    let text: String = tokens
        .iter()
        .filter_map(|token| match token {
            Token::Text(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "1 < 2");
}
