//! Integration tests for the stylesheet parser and serializer.

use wombat_css::{NodeKind, parse_css, serialize};

fn tree(css: &str) -> String {
    let sheet = parse_css(css);
    assert!(sheet.issues.is_empty(), "unexpected issues: {:?}", sheet.issues);
    sheet.root.to_string()
}

// ========== declarations ==========

#[test]
fn test_importance_is_a_trailing_node() {
    assert_eq!(
        tree("a { color: red !important }"),
        r#"stylesheet(style(selector(selector-seq(selector-single(selector-tag("a")))), rules(rule("color", values(value("red")), importance("important")))))"#
    );
}

#[test]
fn test_custom_property_and_var_fallback() {
    assert_eq!(
        tree("a { --x: 1px; width: var(--x, 2px) }"),
        r#"stylesheet(style(selector(selector-seq(selector-single(selector-tag("a")))), rules(var-decl("--x", values(value("1px"))), rule("width", values(value(var("--x", arguments(value("2px")))))))))"#
    );
}

#[test]
fn test_url_quotes_are_removed() {
    assert!(tree("a { background: url( 'x.png' ) }").contains(r#"value(url("x.png"))"#));
}

#[test]
fn test_named_function_argument() {
    assert!(
        tree("a { filter: alpha(opacity=50) }")
            .contains(r#"function("alpha", arguments(named-argument("opacity", value("50"))))"#)
    );
}

#[test]
fn test_number_and_unit_are_one_value() {
    assert!(tree("a { font: 12px/1.5 serif }").contains(
        r#"values(expression(value("12px"), infix-operator("/"), value("1.5")), value("serif"))"#
    ));
}

// ========== selectors ==========

#[test]
fn test_compound_and_combinator() {
    assert_eq!(
        tree("ul > li.a:first-child {}"),
        r#"stylesheet(style(selector(selector-seq(selector-single(selector-tag("ul")), path-operator(">"), selector-single(selector-tag("li"), selector-class("a"), selector-pseudo-class("first-child")))), rules()))"#
    );
}

#[test]
fn test_selector_list_and_attributes() {
    let text = tree(r#"a[href^="http"], input[disabled]::placeholder {}"#);
    assert!(text.contains(r#"selector-attr("href", "^=", "http")"#));
    assert!(text.contains(r#"selector-attr-present("disabled"), selector-pseudo-element("placeholder")"#));
}

#[test]
fn test_functional_pseudo_classes() {
    let text = tree("li:nth-child(2n+1):not(.a, #b) {}");
    assert!(text.contains(
        r#"selector-pseudo-class-fn("nth-child", selector-function-arguments("2", "n", "+", "1"))"#
    ));
    assert!(text.contains(r#"selector-pseudo-class-fn("not", selector-function-arguments(selector-seq(selector-single(selector-class("a"))), selector-seq(selector-single(selector-id("b")))))"#));
}

// ========== at-rules ==========

#[test]
fn test_media_prelude() {
    assert_eq!(
        tree("@media screen and (min-width: 600px) { p { color: red } }"),
        r#"stylesheet(atrule-block("media", prelude(media-test(media-type("screen"), media-property("min-width", "600px"))), scope(style(selector(selector-seq(selector-single(selector-tag("p")))), rules(rule("color", values(value("red"))))))))"#
    );
}

#[test]
fn test_media_query_list() {
    assert!(tree("@media print, not screen {}").contains(
        r#"prelude(media-tests(media-test(media-type("print")), media-test(media-type("not", "screen"))))"#
    ));
}

#[test]
fn test_supports_prelude() {
    assert!(tree("@supports (display: grid) and (not (display: inline-grid)) {}").contains(
        r#"prelude(boolexpr(supports-test("display", "grid"), operator("and"), boolexpr(operator("not"), supports-test("display", "inline-grid"))))"#
    ));
}

#[test]
fn test_import_prelude() {
    assert_eq!(
        tree("@import 'a.css';"),
        r#"stylesheet(atrule-simple("import", prelude(value("'a.css'"))))"#
    );
}

#[test]
fn test_font_face_is_a_style_at_rule() {
    let sheet = parse_css(r#"@font-face { font-family: "Open Sans"; src: url(open.woff2) }"#);
    let rule = sheet.statements().next().unwrap();
    assert_eq!(rule.kind, NodeKind::AtruleStyle);
    assert_eq!(rule.text(0), Some("font-face"));
    assert_eq!(rule.node(2).unwrap().kind, NodeKind::Rules);
}

#[test]
fn test_keyframe_selectors() {
    let text = tree("@keyframes spin { from { opacity: 0 } 50% { opacity: 1 } }");
    assert!(text.contains(r#"selector-single(selector-tag("from"))"#));
    assert!(text.contains(r#"selector-single(selector-percentage("50"))"#));
}

// ========== recovery ==========

#[test]
fn test_stray_closer_and_unclosed_block() {
    let sheet = parse_css("a { color: red; } } b { color: blue");
    assert_eq!(sheet.statements().count(), 2);
    assert_eq!(sheet.issues.len(), 1);
}

#[test]
fn test_declaration_without_colon_is_skipped() {
    let sheet = parse_css("a { color red; fill: blue }");
    let rules = sheet.statements().next().unwrap().node(1).unwrap();
    assert_eq!(rules.args.len(), 1);
    assert_eq!(rules.node(0).unwrap().text(0), Some("fill"));
    assert_eq!(sheet.issues.len(), 1);
}

#[test]
fn test_unknown_at_rule_is_skipped() {
    let sheet = parse_css("@frobnicate x; a {}");
    assert_eq!(sheet.statements().count(), 1);
    assert!(sheet.issues[0].contains("frobnicate"));
}

// ========== serialization ==========

const SHEET: &str = r#"
@charset "utf-8";
@import url("base.css") screen;
:root { --main: #336699; }
a:hover, .nav > li + li { color: var(--main, red) !important; margin: 0 auto }
@media screen and (min-width: 600px) { p.note { font: 12px/1.5 serif } }
@font-face { font-family: "Open Sans"; src: url(open.woff2) format("woff2"), url(open.ttf) }
@supports not (display: grid) { div { float: left } }
input[type="text"]::placeholder { opacity: 0.5 }
li:nth-child(2n+1) { background: rgb(255, 0, 0) }
"#;

#[test]
fn test_serialize_then_parse_gives_same_tree() {
    let sheet = parse_css(SHEET);
    assert!(sheet.issues.is_empty(), "{:?}", sheet.issues);
    assert_eq!(sheet.statements().count(), 9);

    let text = serialize(&sheet.root);
    let reparsed = parse_css(&text);
    assert!(reparsed.issues.is_empty(), "{:?}", reparsed.issues);
    assert_eq!(reparsed.root, sheet.root, "serialized as:\n{text}");
}

#[test]
fn test_serialized_rule_text() {
    let sheet = parse_css("a:hover,.nav>li{color:var(--main,red)!important;margin:0 auto}");
    assert_eq!(
        serialize(&sheet.root),
        "a:hover, .nav > li {color: var(--main, red) !important; margin: 0 auto}"
    );
}

#[test]
fn test_escaped_quote_survives_serialization() {
    let sheet = parse_css(r#"p[title="x\"y"]::before { content: "a\"b"; color: red }"#);
    assert!(sheet.issues.is_empty(), "{:?}", sheet.issues);

    let text = serialize(&sheet.root);
    assert!(text.contains(r#"content: "a\"b""#), "serialized as:\n{text}");
    let reparsed = parse_css(&text);
    assert!(reparsed.issues.is_empty(), "{:?}", reparsed.issues);
    assert_eq!(reparsed.root, sheet.root);
}
