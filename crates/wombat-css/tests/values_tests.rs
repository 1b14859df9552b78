//! Tests for lengths, colors, media queries and link scanning.

use wombat_css::{
    ColorSpec, CssError, FontSource, MediaEnvironment, Rgba, parse_color, parse_css,
    parse_inline_style, scan_font_faces, scan_fonts, scan_imports, scan_links, scan_urls, units,
};

fn px(spec: &str) -> f64 {
    units(spec, 96.0, Some(200.0), 10.0, Some(16.0)).unwrap()
}

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() < 1e-9
}

// ========== units ==========

#[test]
fn test_absolute_units() {
    assert!(close(px("12pt"), 16.0));
    assert!(close(px("1in"), 96.0));
    assert!(close(px("2.54cm"), 96.0));
    assert!(close(px("25.4mm"), 96.0));
    assert!(close(px("1pc"), 16.0));
    assert!(close(px("101.6Q"), 96.0));
    assert!(close(units("1in", 300.0, None, 0.0, None).unwrap(), 300.0));
}

#[test]
fn test_relative_units() {
    assert!(close(px("2em"), 32.0));
    assert!(close(px("1ex"), 8.0));
    assert!(close(px("50%"), 110.0));
}

#[test]
fn test_plain_numbers() {
    assert!(close(px("10"), 10.0));
    assert!(close(px(" 3px "), 3.0));
    assert!(close(px("-1.5"), -1.5));
    assert!(close(px(""), 0.0));
    assert!(close(px("null"), 0.0));
}

#[test]
fn test_unit_errors() {
    assert_eq!(
        units("2em", 96.0, None, 0.0, None),
        Err(CssError::MissingEmSize("2em".to_owned()))
    );
    assert_eq!(
        units("5%", 96.0, None, 0.0, None),
        Err(CssError::MissingPercentage("5%".to_owned()))
    );
    assert_eq!(
        units("abcpx", 96.0, None, 0.0, None),
        Err(CssError::NotANumber("abc".to_owned()))
    );
}

// ========== colors ==========

fn rgba(spec: &str) -> Rgba {
    match parse_color(spec) {
        Ok(ColorSpec::Rgba(color)) => color,
        other => panic!("{spec}: {other:?}"),
    }
}

#[test]
fn test_color_keywords() {
    assert_eq!(parse_color("none"), Ok(ColorSpec::Transparent));
    assert_eq!(parse_color("transparent"), Ok(ColorSpec::Transparent));
    assert_eq!(parse_color("currentColor"), Ok(ColorSpec::CurrentColor));
    assert_eq!(parse_color("inherit"), Ok(ColorSpec::Inherit));
}

#[test]
fn test_named_colors() {
    assert_eq!(rgba("red"), Rgba::rgb(1.0, 0.0, 0.0));
    assert_eq!(rgba("White"), Rgba::rgb(1.0, 1.0, 1.0));
    assert_eq!(rgba("slategrey").to_string(), "#708090");
    assert_eq!(rgba("lightgoldenrodyellow").to_string(), "#fafad2");
}

#[test]
fn test_hex_colors() {
    assert_eq!(rgba("#f00"), Rgba::rgb(1.0, 0.0, 0.0));
    assert_eq!(rgba("#336699").to_string(), "#336699");
    assert!(close(rgba("#ff000080").alpha, 128.0 / 255.0));
    assert!(close(rgba("#0f08").alpha, 8.0 / 15.0));
    assert!(matches!(parse_color("#12345"), Err(CssError::BadColor(_))));
}

#[test]
fn test_color_functions() {
    assert_eq!(rgba("rgb(255, 0, 0)"), Rgba::rgb(1.0, 0.0, 0.0));
    assert_eq!(rgba("rgb(100%, 0%, 0%)"), Rgba::rgb(1.0, 0.0, 0.0));
    assert_eq!(rgba("rgb(300, -5, 0)"), Rgba::rgb(1.0, 0.0, 0.0));

    let translucent = rgba("rgba(0 0 255 / 0.5)");
    assert!(close(translucent.alpha, 0.5));
    assert_eq!(translucent.to_string(), "rgba(0, 0, 255, 0.5)");

    assert_eq!(rgba("hsl(0, 100%, 50%)").to_string(), "#ff0000");
    assert_eq!(rgba("hsl(240deg 100% 50%)").to_string(), "#0000ff");
    assert_eq!(rgba("hsl(0, 0%, 50%)").to_string(), "#808080");
}

#[test]
fn test_bad_colors() {
    assert!(matches!(parse_color("notacolor"), Err(CssError::BadColor(_))));
    assert!(matches!(parse_color("rgb(1, 2)"), Err(CssError::BadColor(_))));
    assert!(matches!(
        parse_color("rgb(a, b, c)"),
        Err(CssError::NotANumber(_))
    ));
}

// ========== media ==========

fn media(env: &MediaEnvironment, query: &str) -> bool {
    let sheet = parse_css(&format!("@media {query} {{}}"));
    let rule = sheet.statements().next().unwrap();
    env.matches(rule.node(1).unwrap())
}

#[test]
fn test_media_types() {
    let env = MediaEnvironment::default();
    assert!(media(&env, "screen"));
    assert!(media(&env, "all"));
    assert!(media(&env, "only screen"));
    assert!(!media(&env, "print"));
    assert!(media(&env, "not print"));
    assert!(media(&env, "print, screen"));
}

#[test]
fn test_media_features() {
    let env = MediaEnvironment::default();
    assert!(media(&env, "(min-width: 600px)"));
    assert!(!media(&env, "(max-width: 600px)"));
    assert!(media(&env, "(min-width: 40em)"));
    assert!(media(&env, "screen and (orientation: landscape)"));
    assert!(!media(&env, "(orientation: portrait)"));
    assert!(media(&env, "(max-resolution: 96dpi)"));
    assert!(!media(&env, "(min-resolution: 2dppx)"));
    assert!(media(&env, "(color)"));
    assert!(!media(&env, "(hover: hover)"));
}

#[test]
fn test_color_scheme_preference() {
    let light = MediaEnvironment::default();
    let dark = MediaEnvironment {
        color_scheme: "dark".to_owned(),
        ..MediaEnvironment::default()
    };
    assert!(!media(&light, "(prefers-color-scheme: dark)"));
    assert!(media(&dark, "(prefers-color-scheme: dark)"));
}

#[test]
fn test_media_environment_from_json() {
    let env: MediaEnvironment = serde_json::from_str(r#"{"media_type": "print"}"#).unwrap();
    assert_eq!(env.media_type, "print");
    assert!(close(env.width, 1024.0));
}

// ========== declarations ==========

#[test]
fn test_inline_style_flags() {
    let declarations = parse_inline_style("color: red !important; --gap: 4px; margin: 0");
    assert_eq!(declarations.len(), 3);
    assert!(declarations[0].important);
    assert!(declarations[1].is_custom_property());
    assert!(!declarations[2].important);
    assert_eq!(declarations[2].value.to_string(), "0");
}

// ========== links ==========

const LINKED: &str = r#"
@import "base.css";
@import url(print.css) print;
a { background: url(bg.png) no-repeat }
@media screen { p { list-style: url("dot.gif") } }
@font-face {
    font-family: "Open Sans";
    font-weight: bold;
    src: url(open.woff2) format("woff2"), url(open.ttf);
}
"#;

#[test]
fn test_scan_imports_and_urls() {
    let sheet = parse_css(LINKED);
    assert_eq!(scan_imports(&sheet.root), ["base.css", "print.css"]);
    assert_eq!(scan_urls(&sheet.root), ["bg.png", "dot.gif"]);
    assert_eq!(scan_fonts(&sheet.root), ["open.woff2", "open.ttf"]);
}

#[test]
fn test_scan_links_order() {
    let sheet = parse_css(LINKED);
    assert_eq!(
        scan_links(&sheet.root),
        ["base.css", "print.css", "bg.png", "dot.gif", "open.woff2", "open.ttf"]
    );
}

#[test]
fn test_font_faces() {
    let sheet = parse_css(LINKED);
    let faces = scan_font_faces(&sheet.root);
    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].family, "Open Sans");
    assert_eq!(faces[0].weight.as_deref(), Some("bold"));
    assert_eq!(faces[0].style, None);
    assert_eq!(
        faces[0].sources,
        [
            FontSource {
                url: "open.woff2".to_owned(),
                format: Some("woff2".to_owned()),
            },
            FontSource {
                url: "open.ttf".to_owned(),
                format: None,
            },
        ]
    );
}

#[test]
fn test_no_links() {
    let sheet = parse_css("a { color: red }");
    assert!(scan_links(&sheet.root).is_empty());
}
