//! Character reference decoding.
//!
//! [XML 1.0 § 4.1 Character and Entity References](https://www.w3.org/TR/xml/#sec-references)
//!
//! XML documents only know the five predefined entities plus numeric
//! references. Tag-soup HTML additionally resolves the common HTML named
//! references below. Unknown references are kept literally.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::scanner::Mode;

/// [§ 4.6 Predefined Entities](https://www.w3.org/TR/xml/#sec-predefined-ent)
const PREDEFINED: [(&str, &str); 5] = [
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
];

/// HTML named character references understood in tag-soup mode.
static HTML_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("nbsp", "\u{00A0}"),
        ("copy", "\u{00A9}"),
        ("reg", "\u{00AE}"),
        ("trade", "\u{2122}"),
        ("mdash", "\u{2014}"),
        ("ndash", "\u{2013}"),
        ("hellip", "\u{2026}"),
        ("bull", "\u{2022}"),
        ("middot", "\u{00B7}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("laquo", "\u{00AB}"),
        ("raquo", "\u{00BB}"),
        ("cent", "\u{00A2}"),
        ("pound", "\u{00A3}"),
        ("euro", "\u{20AC}"),
        ("yen", "\u{00A5}"),
        ("times", "\u{00D7}"),
        ("divide", "\u{00F7}"),
        ("plusmn", "\u{00B1}"),
        ("deg", "\u{00B0}"),
        ("larr", "\u{2190}"),
        ("rarr", "\u{2192}"),
        ("uarr", "\u{2191}"),
        ("darr", "\u{2193}"),
        ("shy", "\u{00AD}"),
        ("sect", "\u{00A7}"),
        ("para", "\u{00B6}"),
        ("eacute", "\u{00E9}"),
        ("egrave", "\u{00E8}"),
        ("aacute", "\u{00E1}"),
        ("agrave", "\u{00E0}"),
        ("auml", "\u{00E4}"),
        ("ouml", "\u{00F6}"),
        ("uuml", "\u{00FC}"),
        ("Auml", "\u{00C4}"),
        ("Ouml", "\u{00D6}"),
        ("Uuml", "\u{00DC}"),
        ("szlig", "\u{00DF}"),
        ("ccedil", "\u{00E7}"),
        ("ntilde", "\u{00F1}"),
    ])
});

/// Look up a named reference (without `&` and `;`).
#[must_use]
pub fn lookup_entity(name: &str, mode: Mode) -> Option<&'static str> {
    PREDEFINED
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, value)| *value)
        .or_else(|| match mode {
            Mode::Xml => None,
            Mode::TagSoup => HTML_ENTITIES.get(name).copied(),
        })
}

/// [§ 4.1 Character Reference](https://www.w3.org/TR/xml/#NT-CharRef)
///
/// "CharRef ::= '&#' [0-9]+ ';' | '&#x' [0-9a-fA-F]+ ';'"
fn numeric_reference(body: &str) -> Option<char> {
    let code = match body.strip_prefix('x').or_else(|| body.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => body.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

/// Decode every character reference in `text`.
///
/// Returns the decoded string and whether an unresolvable reference was seen.
#[must_use]
pub fn decode(text: &str, mode: Mode) -> (String, bool) {
    if !text.contains('&') {
        return (text.to_owned(), false);
    }

    let mut out = String::with_capacity(text.len());
    let mut bad = false;
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let reference = after
            .find(';')
            .filter(|&end| end > 0 && end <= 32)
            .map(|end| (&after[..end], end));

        let replacement = reference.and_then(|(body, _)| {
            body.strip_prefix('#').map_or_else(
                || lookup_entity(body, mode).map(str::to_owned),
                |numeric| numeric_reference(numeric).map(String::from),
            )
        });

        match (replacement, reference) {
            (Some(value), Some((_, end))) => {
                out.push_str(&value);
                rest = &after[end + 1..];
            }
            _ => {
                bad = true;
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    (out, bad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_predefined_and_numeric() {
        assert_eq!(
            decode("a &lt; b &amp;&#65;&#x42;", Mode::Xml),
            ("a < b &AB".to_owned(), false)
        );
    }

    #[test]
    fn test_html_entities_only_in_tag_soup() {
        assert_eq!(decode("&nbsp;", Mode::TagSoup).0, "\u{00A0}");
        assert_eq!(decode("&nbsp;", Mode::Xml), ("&nbsp;".to_owned(), true));
    }

    #[test]
    fn test_bare_ampersand_is_kept() {
        assert_eq!(decode("R&D", Mode::TagSoup), ("R&D".to_owned(), true));
    }
}
