//! [CSS Color](https://www.w3.org/TR/css-color-4/) parsing.

use std::fmt;

use crate::error::CssError;
use crate::units::parse_number;

/// A color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    /// Red component.
    pub red: f64,
    /// Green component.
    pub green: f64,
    /// Blue component.
    pub blue: f64,
    /// Opacity; 1.0 is opaque.
    pub alpha: f64,
}

impl Rgba {
    /// An opaque color.
    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn from_hex(hex: u32) -> Self {
        Self::rgb(
            ((hex >> 16) & 0xFF) as f64 / 255.0,
            ((hex >> 8) & 0xFF) as f64 / 255.0,
            (hex & 0xFF) as f64 / 255.0,
        )
    }
}

/// `#rrggbb`, or `rgba(r, g, b, a)` when not opaque.
impl fmt::Display for Rgba {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |component: f64| (component.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.alpha >= 1.0 {
            write!(
                f,
                "#{:02x}{:02x}{:02x}",
                byte(self.red),
                byte(self.green),
                byte(self.blue)
            )
        } else {
            write!(
                f,
                "rgba({}, {}, {}, {})",
                byte(self.red),
                byte(self.green),
                byte(self.blue),
                self.alpha
            )
        }
    }
}

/// What a color value asks for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpec {
    /// A concrete color.
    Rgba(Rgba),
    /// `none` or `transparent`: nothing is painted.
    Transparent,
    /// `currentColor`: the `color` property of the element.
    CurrentColor,
    /// `inherit`: the same property of the parent element.
    Inherit,
}

/// [§ 6.1 Named Colors](https://www.w3.org/TR/css-color-4/#named-colors),
/// sorted by name.
const WEB_COLORS: [(&str, u32); 147] = [
    ("aliceblue", 0xF0F8FF),
    ("antiquewhite", 0xFAEBD7),
    ("aqua", 0x00FFFF),
    ("aquamarine", 0x7FFFD4),
    ("azure", 0xF0FFFF),
    ("beige", 0xF5F5DC),
    ("bisque", 0xFFE4C4),
    ("black", 0x000000),
    ("blanchedalmond", 0xFFEBCD),
    ("blue", 0x0000FF),
    ("blueviolet", 0x8A2BE2),
    ("brown", 0xA52A2A),
    ("burlywood", 0xDEB887),
    ("cadetblue", 0x5F9EA0),
    ("chartreuse", 0x7FFF00),
    ("chocolate", 0xD2691E),
    ("coral", 0xFF7F50),
    ("cornflowerblue", 0x6495ED),
    ("cornsilk", 0xFFF8DC),
    ("crimson", 0xDC143C),
    ("cyan", 0x00FFFF),
    ("darkblue", 0x00008B),
    ("darkcyan", 0x008B8B),
    ("darkgoldenrod", 0xB8860B),
    ("darkgray", 0xA9A9A9),
    ("darkgreen", 0x006400),
    ("darkgrey", 0xA9A9A9),
    ("darkkhaki", 0xBDB76B),
    ("darkmagenta", 0x8B008B),
    ("darkolivegreen", 0x556B2F),
    ("darkorange", 0xFF8C00),
    ("darkorchid", 0x9932CC),
    ("darkred", 0x8B0000),
    ("darksalmon", 0xE9967A),
    ("darkseagreen", 0x8FBC8F),
    ("darkslateblue", 0x483D8B),
    ("darkslategray", 0x2F4F4F),
    ("darkslategrey", 0x2F4F4F),
    ("darkturquoise", 0x00CED1),
    ("darkviolet", 0x9400D3),
    ("deeppink", 0xFF1493),
    ("deepskyblue", 0x00BFFF),
    ("dimgray", 0x696969),
    ("dimgrey", 0x696969),
    ("dodgerblue", 0x1E90FF),
    ("firebrick", 0xB22222),
    ("floralwhite", 0xFFFAF0),
    ("forestgreen", 0x228B22),
    ("fuchsia", 0xFF00FF),
    ("gainsboro", 0xDCDCDC),
    ("ghostwhite", 0xF8F8FF),
    ("gold", 0xFFD700),
    ("goldenrod", 0xDAA520),
    ("gray", 0x808080),
    ("green", 0x008000),
    ("greenyellow", 0xADFF2F),
    ("grey", 0x808080),
    ("honeydew", 0xF0FFF0),
    ("hotpink", 0xFF69B4),
    ("indianred", 0xCD5C5C),
    ("indigo", 0x4B0082),
    ("ivory", 0xFFFFF0),
    ("khaki", 0xF0E68C),
    ("lavender", 0xE6E6FA),
    ("lavenderblush", 0xFFF0F5),
    ("lawngreen", 0x7CFC00),
    ("lemonchiffon", 0xFFFACD),
    ("lightblue", 0xADD8E6),
    ("lightcoral", 0xF08080),
    ("lightcyan", 0xE0FFFF),
    ("lightgoldenrodyellow", 0xFAFAD2),
    ("lightgray", 0xD3D3D3),
    ("lightgreen", 0x90EE90),
    ("lightgrey", 0xD3D3D3),
    ("lightpink", 0xFFB6C1),
    ("lightsalmon", 0xFFA07A),
    ("lightseagreen", 0x20B2AA),
    ("lightskyblue", 0x87CEFA),
    ("lightslategray", 0x778899),
    ("lightslategrey", 0x778899),
    ("lightsteelblue", 0xB0C4DE),
    ("lightyellow", 0xFFFFE0),
    ("lime", 0x00FF00),
    ("limegreen", 0x32CD32),
    ("linen", 0xFAF0E6),
    ("magenta", 0xFF00FF),
    ("maroon", 0x800000),
    ("mediumaquamarine", 0x66CDAA),
    ("mediumblue", 0x0000CD),
    ("mediumorchid", 0xBA55D3),
    ("mediumpurple", 0x9370DB),
    ("mediumseagreen", 0x3CB371),
    ("mediumslateblue", 0x7B68EE),
    ("mediumspringgreen", 0x00FA9A),
    ("mediumturquoise", 0x48D1CC),
    ("mediumvioletred", 0xC71585),
    ("midnightblue", 0x191970),
    ("mintcream", 0xF5FFFA),
    ("mistyrose", 0xFFE4E1),
    ("moccasin", 0xFFE4B5),
    ("navajowhite", 0xFFDEAD),
    ("navy", 0x000080),
    ("oldlace", 0xFDF5E6),
    ("olive", 0x808000),
    ("olivedrab", 0x6B8E23),
    ("orange", 0xFFA500),
    ("orangered", 0xFF4500),
    ("orchid", 0xDA70D6),
    ("palegoldenrod", 0xEEE8AA),
    ("palegreen", 0x98FB98),
    ("paleturquoise", 0xAFEEEE),
    ("palevioletred", 0xDB7093),
    ("papayawhip", 0xFFEFD5),
    ("peachpuff", 0xFFDAB9),
    ("peru", 0xCD853F),
    ("pink", 0xFFC0CB),
    ("plum", 0xDDA0DD),
    ("powderblue", 0xB0E0E6),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("rosybrown", 0xBC8F8F),
    ("royalblue", 0x4169E1),
    ("saddlebrown", 0x8B4513),
    ("salmon", 0xFA8072),
    ("sandybrown", 0xF4A460),
    ("seagreen", 0x2E8B57),
    ("seashell", 0xFFF5EE),
    ("sienna", 0xA0522D),
    ("silver", 0xC0C0C0),
    ("skyblue", 0x87CEEB),
    ("slateblue", 0x6A5ACD),
    ("slategray", 0x708090),
    ("slategrey", 0x708090),
    ("snow", 0xFFFAFA),
    ("springgreen", 0x00FF7F),
    ("steelblue", 0x4682B4),
    ("tan", 0xD2B48C),
    ("teal", 0x008080),
    ("thistle", 0xD8BFD8),
    ("tomato", 0xFF6347),
    ("turquoise", 0x40E0D0),
    ("violet", 0xEE82EE),
    ("wheat", 0xF5DEB3),
    ("white", 0xFFFFFF),
    ("whitesmoke", 0xF5F5F5),
    ("yellow", 0xFFFF00),
    ("yellowgreen", 0x9ACD32),
];

/// Look up a named color, ignoring case.
#[must_use]
pub fn named_color(name: &str) -> Option<Rgba> {
    let name = name.to_ascii_lowercase();
    WEB_COLORS
        .binary_search_by(|(candidate, _)| (*candidate).cmp(name.as_str()))
        .ok()
        .map(|index| Rgba::from_hex(WEB_COLORS[index].1))
}

/// Parse a color value.
///
/// Accepts the keywords `none`, `transparent`, `currentColor` and `inherit`,
/// the named colors, `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`,
/// `rgba()`, `hsl()` and `hsla()`. Out of range components are clamped.
///
/// # Errors
///
/// Returns [`CssError::BadColor`] for anything else, and
/// [`CssError::NotANumber`] for a malformed component of a color function.
pub fn parse_color(spec: &str) -> Result<ColorSpec, CssError> {
    let spec = spec.trim();
    let lower = spec.to_ascii_lowercase();
    let bad = || CssError::BadColor(spec.to_owned());

    match lower.as_str() {
        "" | "none" | "transparent" => return Ok(ColorSpec::Transparent),
        "currentcolor" => return Ok(ColorSpec::CurrentColor),
        "inherit" => return Ok(ColorSpec::Inherit),
        _ => {}
    }
    if let Some(color) = named_color(&lower) {
        return Ok(ColorSpec::Rgba(color));
    }
    if let Some(hex) = lower.strip_prefix('#') {
        return parse_hex(hex).map(ColorSpec::Rgba).ok_or_else(bad);
    }

    let (function, arguments) = lower
        .strip_suffix(')')
        .and_then(|rest| rest.split_once('('))
        .ok_or_else(bad)?;
    let components: Vec<&str> = if arguments.contains(',') {
        arguments.split(',').map(str::trim).collect()
    } else {
        arguments
            .split(|c: char| c.is_whitespace() || c == '/')
            .filter(|part| !part.is_empty())
            .collect()
    };

    let color = match (function.trim(), components.as_slice()) {
        ("rgb" | "rgba", [red, green, blue, rest @ ..]) if rest.len() <= 1 => Rgba {
            red: rgb_component(red)?,
            green: rgb_component(green)?,
            blue: rgb_component(blue)?,
            alpha: rest.first().map_or(Ok(1.0), |alpha| alpha_component(alpha))?,
        },
        ("hsl" | "hsla", [hue, saturation, lightness, rest @ ..]) if rest.len() <= 1 => {
            let hue = parse_number(hue.trim_end_matches("deg"))?.clamp(0.0, 360.0) / 360.0;
            let saturation = percentage(saturation)?;
            let lightness = percentage(lightness)?;
            let (red, green, blue) = hls_to_rgb(hue, lightness, saturation);
            Rgba {
                red,
                green,
                blue,
                alpha: rest.first().map_or(Ok(1.0), |alpha| alpha_component(alpha))?,
            }
        }
        _ => return Err(bad()),
    };
    Ok(ColorSpec::Rgba(color))
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    let digit = |i: usize| u8::from_str_radix(hex.get(i..=i)?, 16).ok().map(f64::from);
    let pair = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok().map(f64::from);
    match hex.len() {
        3 | 4 => Some(Rgba {
            red: digit(0)? / 15.0,
            green: digit(1)? / 15.0,
            blue: digit(2)? / 15.0,
            alpha: if hex.len() == 4 { digit(3)? / 15.0 } else { 1.0 },
        }),
        6 | 8 => Some(Rgba {
            red: pair(0)? / 255.0,
            green: pair(2)? / 255.0,
            blue: pair(4)? / 255.0,
            alpha: if hex.len() == 8 { pair(6)? / 255.0 } else { 1.0 },
        }),
        _ => None,
    }
}

/// An integer in `0..=255` or a percentage.
fn rgb_component(text: &str) -> Result<f64, CssError> {
    let value = match text.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0,
        None => parse_number(text)? / 255.0,
    };
    Ok(value.clamp(0.0, 1.0))
}

fn alpha_component(text: &str) -> Result<f64, CssError> {
    let value = match text.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0,
        None => parse_number(text)?,
    };
    Ok(value.clamp(0.0, 1.0))
}

fn percentage(text: &str) -> Result<f64, CssError> {
    let number = parse_number(text.strip_suffix('%').unwrap_or(text))?;
    Ok(number.clamp(0.0, 100.0) / 100.0)
}

/// HSL to RGB, all components in `0.0..=1.0`.
fn hls_to_rgb(hue: f64, lightness: f64, saturation: f64) -> (f64, f64, f64) {
    if saturation.abs() < f64::EPSILON {
        return (lightness, lightness, lightness);
    }
    let m2 = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let m1 = 2.0 * lightness - m2;
    let channel = |hue: f64| {
        let hue = hue.rem_euclid(1.0);
        if hue < 1.0 / 6.0 {
            (m2 - m1).mul_add(hue * 6.0, m1)
        } else if hue < 0.5 {
            m2
        } else if hue < 2.0 / 3.0 {
            (m2 - m1).mul_add((2.0 / 3.0 - hue) * 6.0, m1)
        } else {
            m1
        }
    };
    (channel(hue + 1.0 / 3.0), channel(hue), channel(hue - 1.0 / 3.0))
}
