//! Integration tests for tree construction.

use quickcheck_macros::quickcheck;
use wombat_dom::{DomTree, NodeId, NodeType, QualName, ns, to_xml};
use wombat_xml::{parse_html, parse_xml};

fn element_names(tree: &DomTree) -> Vec<String> {
    tree.elements(NodeId::ROOT)
        .filter_map(|id| tree.as_element(id))
        .map(|data| data.name.local.clone())
        .collect()
}

// ========== namespaces ==========

#[test]
fn test_default_namespace_applies_to_elements_only() {
    let tree = parse_xml(r#"<svg xmlns="http://www.w3.org/2000/svg" width="10"><rect/></svg>"#)
        .unwrap();
    let root = tree.document_element().unwrap();
    let data = tree.as_element(root).unwrap();
    assert!(data.name.is(Some(ns::SVG), "svg"));
    assert_eq!(data.attrs.get(&QualName::local("width")).map(String::as_str), Some("10"));
    assert!(!data.attrs.keys().any(|name| name.local == "xmlns"));
    assert_eq!(data.namespaces, vec![(None, ns::SVG.to_owned())]);

    let rect = tree.element_children(root).next().unwrap();
    assert!(tree.as_element(rect).unwrap().name.is(Some(ns::SVG), "rect"));
}

#[test]
fn test_prefixed_attribute_resolves() {
    let tree = parse_xml(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a" xml:space="preserve"/></svg>"##,
    )
    .unwrap();
    let root = tree.document_element().unwrap();
    let use_element = tree.element_children(root).next().unwrap();
    let data = tree.as_element(use_element).unwrap();
    assert_eq!(data.attr_ns(Some(ns::XLINK), "href"), Some("#a"));
    assert_eq!(data.attr_ns(Some(ns::XML), "space"), Some("preserve"));
}

#[test]
fn test_undeclaring_default_namespace() {
    let tree = parse_xml(r#"<a xmlns="urn:x"><b xmlns=""/></a>"#).unwrap();
    let root = tree.document_element().unwrap();
    let b = tree.element_children(root).next().unwrap();
    assert_eq!(tree.as_element(b).unwrap().name, QualName::local("b"));
}

#[test]
fn test_unbound_prefix_is_an_error() {
    let error = parse_xml("<a:b/>").unwrap_err();
    assert!(error.message.contains("a:b"));
}

// ========== well-formedness ==========

#[test]
fn test_mismatched_end_tag_is_an_error() {
    let error = parse_xml("<a>\n<b></a>").unwrap_err();
    assert_eq!(error.line, 2);
}

#[test]
fn test_unclosed_root_is_an_error() {
    assert!(parse_xml("<a><b/>").is_err());
}

#[test]
fn test_empty_document_is_an_error() {
    assert!(parse_xml("  ").is_err());
}

#[test]
fn test_two_roots_is_an_error() {
    assert!(parse_xml("<a/><b/>").is_err());
}

#[test]
fn test_text_outside_root_is_an_error() {
    assert!(parse_xml("<a/>tail").is_err());
    assert!(parse_xml("<a/>\n  ").is_ok());
}

#[test]
fn test_prolog_keeps_stylesheet_instruction_but_not_declaration() {
    let tree = parse_xml(
        "<?xml version='1.0'?>\n<?xml-stylesheet href='s.css'?>\n<!DOCTYPE svg><svg/>",
    )
    .unwrap();
    let prolog: Vec<(&str, &str)> = tree.prolog_instructions().collect();
    assert_eq!(prolog, vec![("xml-stylesheet", "href='s.css'")]);
}

#[test]
fn test_adjacent_text_is_merged() {
    let tree = parse_xml("<a>x<![CDATA[<y>]]>&amp;z</a>").unwrap();
    let root = tree.document_element().unwrap();
    assert_eq!(tree.children(root).len(), 1);
    assert_eq!(tree.text_content(root), "x<y>&z");
}

// ========== tag soup ==========

#[test]
fn test_tag_soup_wraps_in_html_root() {
    let (tree, _) = parse_html("<p>one<p>two");
    let root = tree.document_element().unwrap();
    assert_eq!(tree.as_element(root).unwrap().name.local, "html");
    assert_eq!(element_names(&tree), vec!["html", "p", "p"]);
    assert_eq!(tree.element_children(NodeId::ROOT).count(), 1);
}

#[test]
fn test_tag_soup_void_elements_do_not_nest() {
    let (tree, _) = parse_html("<html><body><img src=a.png><br><span>x</span></body></html>");
    let body = tree.elements(NodeId::ROOT).nth(1).unwrap();
    let children: Vec<String> = tree
        .element_children(body)
        .filter_map(|id| tree.as_element(id).map(|data| data.name.local.clone()))
        .collect();
    assert_eq!(children, vec!["img", "br", "span"]);
}

#[test]
fn test_tag_soup_implied_list_item_end() {
    let (tree, _) = parse_html("<ul><li>a<li>b</ul>");
    let ul = tree.elements(NodeId::ROOT).nth(1).unwrap();
    assert_eq!(tree.element_children(ul).count(), 2);
}

#[test]
fn test_tag_soup_stray_end_tag_is_reported_and_ignored() {
    let (tree, issues) = parse_html("<div>a</span>b</div>");
    let div = tree.elements(NodeId::ROOT).nth(1).unwrap();
    assert_eq!(tree.text_content(div), "ab");
    assert!(issues.iter().any(|issue| issue.message.contains("</span>")));
    assert!(issues.iter().all(|issue| !issue.is_error));
}

#[test]
fn test_tag_soup_inline_svg_gets_svg_namespace() {
    let (tree, _) = parse_html("<body><svg><circle r=1></circle></svg></body>");
    let circle = tree
        .elements(NodeId::ROOT)
        .find(|&id| tree.as_element(id).is_some_and(|data| data.name.local == "circle"))
        .unwrap();
    assert_eq!(tree.as_element(circle).unwrap().name.ns.as_deref(), Some(ns::SVG));
}

#[test]
fn test_tag_soup_empty_input_has_root() {
    let (tree, _) = parse_html("");
    assert!(tree.document_element().is_some());
}

// ========== serialization ==========

#[test]
fn test_parse_serialize_parse_is_stable() {
    let source = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><!--c--><g id="a"><use xlink:href="#b"/>t &amp; u</g></svg>"##;
    let first = to_xml(&parse_xml(source).unwrap());
    let second = to_xml(&parse_xml(&first).unwrap());
    assert_eq!(first, source);
    assert_eq!(second, first);
}

#[quickcheck]
fn prop_text_survives_serialization(text: String) -> bool {
    // Control characters other than whitespace are not valid XML.
    let text: String = text
        .chars()
        .filter(|c| !c.is_control() && *c != '\u{FEFF}')
        .collect();
    let source = format!("<a>{}</a>", escape(&text));
    let Ok(tree) = parse_xml(&source) else {
        return false;
    };
    let root = tree.document_element().unwrap();
    tree.text_content(root) == text
        && tree
            .children(root)
            .iter()
            .all(|&id| matches!(tree.get(id).map(|n| &n.node_type), Some(NodeType::Text(_))))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;")
}
