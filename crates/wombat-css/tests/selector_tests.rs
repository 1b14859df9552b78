//! Integration tests for selector compilation and the compiled matcher.

use std::collections::HashMap;

use quickcheck_macros::quickcheck;
use wombat_css::{
    CompiledMatcher, IMPORTANT, MatchContext, Matched, MediaEnvironment, NoContext, Value,
    parse_css,
};
use wombat_dom::{DomTree, NodeId};
use wombat_xml::parse_xml;

/// Puts every element whose id is in the list into `:hover`.
struct Hovered(Vec<&'static str>);

impl MatchContext for Hovered {
    fn pseudo_classes(&self, tree: &DomTree, node: NodeId) -> Vec<String> {
        let id = tree.as_element(node).and_then(|e| e.id());
        if id.is_some_and(|id| self.0.contains(&id)) {
            vec!["hover".to_owned()]
        } else {
            Vec::new()
        }
    }
}

fn matcher(css: &str) -> CompiledMatcher {
    let sheet = parse_css(css);
    assert!(sheet.issues.is_empty(), "{:?}", sheet.issues);
    let (matcher, warnings) = CompiledMatcher::compile(&sheet.root, None);
    assert!(warnings.is_empty(), "{warnings:?}");
    matcher
}

fn document(xml: &str) -> DomTree {
    parse_xml(xml).unwrap()
}

fn by_id(tree: &DomTree, id: &str) -> NodeId {
    tree.element_by_id(id).unwrap()
}

fn style_of(
    css: &str,
    xml: &str,
    id: &str,
    ctx: &dyn MatchContext,
) -> HashMap<String, Matched> {
    let tree = document(xml);
    matcher(css).match_element(&tree, by_id(&tree, id), None, ctx)
}

fn value_of(style: &HashMap<String, Matched>, property: &str) -> Option<String> {
    style.get(property).map(|m| m.value.to_string())
}

// ========== priorities ==========

#[test]
fn test_type_selector_on_bare_element() {
    let tree = document("<a/>");
    let root = tree.document_element().unwrap();
    let style = matcher("a{color:red}").match_element(&tree, root, None, &NoContext);

    let color = &style["color"];
    assert_eq!(color.value, Value::Str("red".to_owned()));
    assert!(color.priority >= 2);
}

#[test]
fn test_compound_priority_with_dynamic_pseudo_class() {
    let css = "a.foo#id:hover { color: red }";
    let xml = r#"<a id="id" class="foo"/>"#;

    let style = style_of(css, xml, "id", &Hovered(vec!["id"]));
    assert_eq!(style["color"].priority, 82);

    assert!(style_of(css, xml, "id", &NoContext).is_empty());
}

#[test]
fn test_universal_selector_priority() {
    let style = style_of("* { color: red }", r#"<a id="x"/>"#, "x", &NoContext);
    assert_eq!(style["color"].priority, 1);
}

#[test]
fn test_class_beats_type_in_any_order() {
    let style = style_of(
        ".c { color: blue } p { color: red }",
        r#"<p id="x" class="c"/>"#,
        "x",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("blue"));
}

#[test]
fn test_important_beats_id() {
    let style = style_of(
        "p { color: red !important } #x { color: blue }",
        r#"<p id="x"/>"#,
        "x",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("red"));
    assert_eq!(style["color"].priority, IMPORTANT + 2);
}

#[test]
fn test_equal_priority_goes_to_later_rule() {
    let style = style_of(
        "p { color: red } p { color: blue }",
        r#"<p id="x"/>"#,
        "x",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("blue"));
}

#[test]
fn test_selector_list_alternatives_are_independent() {
    let css = "h1, .note { color: red }";
    let xml = r#"<r><h1 id="a"/><p id="b" class="note"/><p id="c"/></r>"#;
    assert_eq!(style_of(css, xml, "a", &NoContext)["color"].priority, 2);
    assert_eq!(style_of(css, xml, "b", &NoContext)["color"].priority, 10);
    assert!(style_of(css, xml, "c", &NoContext).is_empty());
}

// ========== combinators ==========

const FAMILY: &str = r#"<div id="d"><h1 id="h"/><p id="p1"/><span><p id="p2"/></span><p id="p3"/></div>"#;

fn family_matches(css: &str) -> Vec<&'static str> {
    let tree = document(FAMILY);
    let matcher = matcher(css);
    ["p1", "p2", "p3"]
        .into_iter()
        .filter(|id| {
            !matcher
                .match_element(&tree, by_id(&tree, id), None, &NoContext)
                .is_empty()
        })
        .collect()
}

#[test]
fn test_child_combinator() {
    assert_eq!(family_matches("div > p { x: y }"), ["p1", "p3"]);
}

#[test]
fn test_descendant_combinator() {
    assert_eq!(family_matches("div p { x: y }"), ["p1", "p2", "p3"]);
    assert_eq!(family_matches("span p { x: y }"), ["p2"]);
}

#[test]
fn test_next_sibling_combinator() {
    assert_eq!(family_matches("h1 + p { x: y }"), ["p1"]);
}

#[test]
fn test_subsequent_sibling_combinator() {
    assert_eq!(family_matches("h1 ~ p { x: y }"), ["p1", "p3"]);
}

#[test]
fn test_descendant_combinator_tries_every_ancestor() {
    // The nearest `b` has no `a` parent; the outer one does.
    let style = style_of(
        "a > b c { color: red }",
        r#"<a><b><b><c id="t"/></b></b></a>"#,
        "t",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("red"));
}

#[test]
fn test_subsequent_sibling_combinator_tries_every_sibling() {
    // The nearest `y` follows `w`; the earlier one follows `x`.
    let style = style_of(
        "x + y ~ z { color: red }",
        r#"<r><x/><y/><w/><y/><z id="t"/></r>"#,
        "t",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("red"));
}

#[test]
fn test_combinator_chain_without_match() {
    let style = style_of(
        "a > b c { color: red }",
        r#"<r><b><b><c id="t"/></b></b></r>"#,
        "t",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color"), None);
}

#[test]
fn test_attribute_value_with_escaped_quote() {
    let style = style_of(
        r#"[title="a\"b"] { color: red }"#,
        r#"<r><p id="t" title='a"b'/></r>"#,
        "t",
        &NoContext,
    );
    assert_eq!(value_of(&style, "color").as_deref(), Some("red"));
}

#[test]
fn test_combinator_priorities() {
    let tree = document(FAMILY);
    let p1 = by_id(&tree, "p1");
    let priority = |css: &str| matcher(css).match_element(&tree, p1, None, &NoContext)["x"].priority;
    assert_eq!(priority("div p { x: y }"), 5);
    assert_eq!(priority("div > p { x: y }"), 6);
    assert_eq!(priority("h1 + p { x: y }"), 9);
}

// ========== pseudo-classes ==========

const LIST: &str = r#"<ul id="u"><li id="a"/><li id="b">text</li><li id="c"/><em id="e"/></ul>"#;

fn list_matches(css: &str) -> Vec<&'static str> {
    let tree = document(LIST);
    let matcher = matcher(css);
    ["u", "a", "b", "c", "e"]
        .into_iter()
        .filter(|id| {
            !matcher
                .match_element(&tree, by_id(&tree, id), None, &NoContext)
                .is_empty()
        })
        .collect()
}

#[test]
fn test_nth_child() {
    assert_eq!(list_matches("li:nth-child(2n+1) { x: y }"), ["a", "c"]);
    assert_eq!(list_matches("li:nth-child(even) { x: y }"), ["b"]);
    assert_eq!(list_matches(":nth-last-child(1) { x: y }"), ["u", "e"]);
}

#[test]
fn test_structural_pseudo_classes() {
    assert_eq!(list_matches(":root { x: y }"), ["u"]);
    assert_eq!(list_matches("li:first-child { x: y }"), ["a"]);
    assert_eq!(list_matches("li:last-of-type { x: y }"), ["c"]);
    assert_eq!(list_matches("em:only-of-type { x: y }"), ["e"]);
    assert_eq!(list_matches("li:empty { x: y }"), ["a", "c"]);
}

#[test]
fn test_not_and_is() {
    assert_eq!(list_matches("li:not(#b) { x: y }"), ["a", "c"]);
    assert_eq!(list_matches(":is(#a, em) { x: y }"), ["a", "e"]);
}

#[test]
fn test_has_with_relative_combinators() {
    let xml = r#"<r><div id="a"><span/></div><div id="b"><p><span/></p></div><h1 id="h"/><p id="p"/></r>"#;
    let css_child = "div:has(> span) { x: y }";
    assert!(!style_of(css_child, xml, "a", &NoContext).is_empty());
    assert!(style_of(css_child, xml, "b", &NoContext).is_empty());

    let css_descendant = "div:has(span) { x: y }";
    assert!(!style_of(css_descendant, xml, "b", &NoContext).is_empty());

    let css_sibling = "h1:has(+ p) { x: y }";
    assert!(!style_of(css_sibling, xml, "h", &NoContext).is_empty());
}

#[test]
fn test_unknown_pseudo_class_function_never_matches() {
    let sheet = parse_css("p:frob(1) { x: y }");
    let (matcher, warnings) = CompiledMatcher::compile(&sheet.root, None);
    assert!(!warnings.is_empty());

    let tree = document(r#"<p id="x"/>"#);
    assert!(
        matcher
            .match_element(&tree, by_id(&tree, "x"), None, &NoContext)
            .is_empty()
    );
}

// ========== attributes ==========

#[test]
fn test_attribute_operators() {
    let xml = r#"<a id="x" lang="en-US" class="a b" href="http://example.com/logo.png"/>"#;
    for css in [
        "[lang] { x: y }",
        "[lang|=en] { x: y }",
        "[class~=b] { x: y }",
        r#"[href^="http"] { x: y }"#,
        r#"[href$=".png"] { x: y }"#,
        "[href*=example] { x: y }",
    ] {
        assert!(!style_of(css, xml, "x", &NoContext).is_empty(), "{css}");
    }
    for css in ["[title] { x: y }", "[lang=en] { x: y }", "[class~=c] { x: y }"] {
        assert!(style_of(css, xml, "x", &NoContext).is_empty(), "{css}");
    }
}

// ========== pseudo-elements ==========

#[test]
fn test_pseudo_element_rules_are_separate() {
    let tree = document(r#"<p id="x"/>"#);
    let x = by_id(&tree, "x");
    let matcher = matcher("p::before { content: x } p { color: red }");

    let plain = matcher.match_element(&tree, x, None, &NoContext);
    assert!(plain.contains_key("color"));
    assert!(!plain.contains_key("content"));

    let before = matcher.match_element(&tree, x, Some("before"), &NoContext);
    assert_eq!(before["content"].priority, 102);
    assert!(!before.contains_key("color"));
}

// ========== media ==========

#[test]
fn test_media_rules_follow_the_environment() {
    let tree = document(r#"<p id="x"/>"#);
    let x = by_id(&tree, "x");
    let matcher = matcher(
        "@media print { p { color: red } } \
         @media (min-width: 600px) { p { fill: blue } } \
         p { margin: 0 }",
    );

    let screen = MediaEnvironment::default();
    let style = matcher.match_element(&tree, x, None, &screen);
    assert!(!style.contains_key("color"));
    assert!(style.contains_key("fill"));
    assert!(style.contains_key("margin"));

    let narrow_print = MediaEnvironment {
        media_type: "print".to_owned(),
        width: 400.0,
        ..MediaEnvironment::default()
    };
    let style = matcher.match_element(&tree, x, None, &narrow_print);
    assert!(style.contains_key("color"));
    assert!(!style.contains_key("fill"));
}

#[test]
fn test_supports_blocks_are_applied() {
    let style = style_of(
        "@supports (display: grid) { p { color: red } }",
        r#"<p id="x"/>"#,
        "x",
        &NoContext,
    );
    assert!(style.contains_key("color"));
}

// ========== index ==========

const TAGS: [&str; 5] = ["*", "div", "p", "span", "li"];
const SUFFIXES: [&str; 8] = [
    "",
    ".x",
    "#a",
    ":hover",
    ".y.x",
    ":first-child",
    "[lang]",
    ":not(.x)",
];
const COMBINATORS: [&str; 5] = ["", " ", " > ", " + ", " ~ "];

const PROPERTY_DOCUMENT: &str = r#"<root>
  <div id="a" class="x" lang="en-US">
    <p class="x y">one</p>
    <span/>
    <p id="b"><li/></p>
  </div>
  <li class="y"/>
</root>"#;

fn compound(pick: u8) -> String {
    format!(
        "{}{}",
        TAGS[usize::from(pick) % TAGS.len()],
        SUFFIXES[usize::from(pick / 8) % SUFFIXES.len()]
    )
}

#[quickcheck]
fn prop_indexed_matching_equals_naive(picks: Vec<(u8, u8, u8)>) -> bool {
    let css: String = picks
        .iter()
        .take(12)
        .map(|&(first, second, property)| {
            let combinator = COMBINATORS[usize::from(property) % COMBINATORS.len()];
            let selector = if combinator.is_empty() {
                compound(first)
            } else {
                format!("{}{combinator}{}", compound(first), compound(second))
            };
            format!("{selector} {{ p{}: v{property} }}\n", property % 4)
        })
        .collect();

    let sheet = parse_css(&css);
    let (matcher, _) = CompiledMatcher::compile(&sheet.root, None);
    let tree = document(PROPERTY_DOCUMENT);
    let ctx = Hovered(vec!["b"]);

    tree.elements(tree.root()).all(|node| {
        matcher.match_element(&tree, node, None, &ctx)
            == matcher.match_naive(&tree, node, None, &ctx)
    })
}
