//! [SVG 2 § 9.3 Path data](https://www.w3.org/TR/SVG2/paths.html#PathData)

use tracing::debug;
use wombat_css::{CssError, parse_number};

/// One drawing command of a path.
///
/// `relative` commands are offsets from the current point.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum PathSegment {
    MoveTo { x: f64, y: f64, relative: bool },
    LineTo { x: f64, y: f64, relative: bool },
    HorizontalTo { x: f64, relative: bool },
    VerticalTo { y: f64, relative: bool },
    CurveTo { x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64, relative: bool },
    SmoothCurveTo { x2: f64, y2: f64, x: f64, y: f64, relative: bool },
    QuadTo { x1: f64, y1: f64, x: f64, y: f64, relative: bool },
    SmoothQuadTo { x: f64, y: f64, relative: bool },
    Arc {
        rx: f64,
        ry: f64,
        angle: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
        relative: bool,
    },
    Close,
}

/// [SVG 2 § 13.3.3 fill-rule](https://www.w3.org/TR/SVG2/painting.html#FillRuleProperty)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    /// `nonzero`.
    #[default]
    Winding,
    /// `evenodd`.
    EvenOdd,
}

impl FillRule {
    /// The rule named by a `fill-rule` value.
    #[must_use]
    pub fn from_css(value: &str) -> Option<Self> {
        match value.trim() {
            "nonzero" => Some(Self::Winding),
            "evenodd" => Some(Self::EvenOdd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Command(char),
    Operand(&'a str),
}

/// Split path data into command letters and operands.
///
/// Commas and whitespace separate; a sign or a second decimal point starts
/// a new number.
fn tokenize(data: &str) -> Vec<Token<'_>> {
    let bytes = data.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() || c == b',' {
            i += 1;
        } else if c.is_ascii_alphabetic() {
            tokens.push(Token::Command(char::from(c)));
            i += 1;
        } else if c.is_ascii_digit() || matches!(c, b'+' | b'-' | b'.') {
            let end = number_end(bytes, i);
            tokens.push(Token::Operand(&data[i..end]));
            i = end;
        } else {
            let end = data[i..]
                .char_indices()
                .nth(1)
                .map_or(data.len(), |(offset, _)| i + offset);
            tokens.push(Token::Operand(&data[i..end]));
            i = end;
        }
    }
    tokens
}

fn number_end(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    if matches!(bytes.get(i), Some(b'+' | b'-')) {
        i += 1;
    }
    let mut seen_point = false;
    while let Some(&c) = bytes.get(i) {
        if c.is_ascii_digit() {
            i += 1;
        } else if c == b'.' && !seen_point {
            seen_point = true;
            i += 1;
        } else {
            break;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        if bytes.get(j).is_some_and(u8::is_ascii_digit) {
            while bytes.get(j).is_some_and(u8::is_ascii_digit) {
                j += 1;
            }
            i = j;
        }
    }
    i.max(start + 1)
}

/// Number of operands one repetition of `command` takes.
const fn arity(command: char) -> Option<usize> {
    match command.to_ascii_uppercase() {
        'Z' => Some(0),
        'H' | 'V' => Some(1),
        'M' | 'L' | 'T' => Some(2),
        'S' | 'Q' => Some(4),
        'C' => Some(6),
        'A' => Some(7),
        _ => None,
    }
}

/// Parse the `d` attribute of a `path` element.
///
/// A command repeats while operands follow it. An operand that is not a
/// number ends the repetition; parsing resumes at the next command letter.
/// Unknown commands are skipped the same way.
#[must_use]
pub fn parse_path(data: &str) -> Vec<PathSegment> {
    let tokens = tokenize(data);
    let mut segments = Vec::new();
    let mut i = 0;

    while let Some(&token) = tokens.get(i) {
        i += 1;
        let Token::Command(command) = token else {
            continue;
        };
        let Some(count) = arity(command) else {
            debug!(command = %command, "unsupported path command");
            continue;
        };
        if count == 0 {
            segments.push(PathSegment::Close);
            continue;
        }

        let mut first = true;
        loop {
            let operands = match operands(&tokens[i.min(tokens.len())..], count) {
                Ok(operands) => operands,
                Err(CssError::NotANumber(text)) if !text.is_empty() => {
                    debug!(operand = %text, "path operand is not a number");
                    break;
                }
                Err(_) => break,
            };
            i += count;
            if let Some(segment) = segment(command, &operands, first) {
                segments.push(segment);
            }
            first = false;
        }
    }
    segments
}

/// The next `count` operands as numbers.
fn operands(tokens: &[Token<'_>], count: usize) -> Result<Vec<f64>, CssError> {
    (0..count)
        .map(|n| match tokens.get(n) {
            Some(Token::Operand(text)) => parse_number(text),
            Some(Token::Command(_)) | None => Err(CssError::NotANumber(String::new())),
        })
        .collect()
}

fn segment(command: char, operands: &[f64], first: bool) -> Option<PathSegment> {
    let relative = command.is_ascii_lowercase();
    Some(match (command.to_ascii_uppercase(), operands) {
        ('M', &[x, y]) if first => PathSegment::MoveTo { x, y, relative },
        ('M' | 'L', &[x, y]) => PathSegment::LineTo { x, y, relative },
        ('H', &[x]) => PathSegment::HorizontalTo { x, relative },
        ('V', &[y]) => PathSegment::VerticalTo { y, relative },
        ('C', &[x1, y1, x2, y2, x, y]) => PathSegment::CurveTo {
            x1,
            y1,
            x2,
            y2,
            x,
            y,
            relative,
        },
        ('S', &[x2, y2, x, y]) => PathSegment::SmoothCurveTo {
            x2,
            y2,
            x,
            y,
            relative,
        },
        ('Q', &[x1, y1, x, y]) => PathSegment::QuadTo {
            x1,
            y1,
            x,
            y,
            relative,
        },
        ('T', &[x, y]) => PathSegment::SmoothQuadTo { x, y, relative },
        ('A', &[rx, ry, angle, large_arc, sweep, x, y]) => PathSegment::Arc {
            rx: rx.abs(),
            ry: ry.abs(),
            angle,
            large_arc: large_arc.abs() > f64::EPSILON,
            sweep: sweep.abs() > f64::EPSILON,
            x,
            y,
            relative,
        },
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_packed_numbers() {
        assert_eq!(
            tokenize("M1.5.5-2e1,3"),
            vec![
                Token::Command('M'),
                Token::Operand("1.5"),
                Token::Operand(".5"),
                Token::Operand("-2e1"),
                Token::Operand("3"),
            ]
        );
    }

    #[test]
    fn test_fill_rule() {
        assert_eq!(FillRule::from_css("nonzero"), Some(FillRule::Winding));
        assert_eq!(FillRule::from_css(" evenodd "), Some(FillRule::EvenOdd));
        assert_eq!(FillRule::from_css("inherit"), None);
    }
}
