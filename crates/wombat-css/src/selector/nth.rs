//! [§ 14.1 The An+B notation](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)

/// A parsed `An+B` pattern.
///
/// "The An+B notation defines an integer step (A) and offset (B), and
/// represents the An+Bth elements in a list, for every positive integer or
/// zero value of n, with the first element in the list having index 1."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nth {
    /// Step.
    pub a: i64,
    /// Offset.
    pub b: i64,
}

impl Nth {
    /// Parse `odd`, `even`, `B`, `An`, `An+B`, `-n+B` and the like.
    ///
    /// Whitespace is ignored; `None` for anything else.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();

        match compact.as_str() {
            "odd" => return Some(Self { a: 2, b: 1 }),
            "even" => return Some(Self { a: 2, b: 0 }),
            "" => return None,
            _ => {}
        }

        let Some((step, offset)) = compact.split_once('n') else {
            return compact.parse().ok().map(|b| Self { a: 0, b });
        };
        let a = match step {
            "" | "+" => 1,
            "-" => -1,
            number => number.parse().ok()?,
        };
        let b = if offset.is_empty() {
            0
        } else if offset.starts_with(['+', '-']) {
            offset.parse().ok()?
        } else {
            return None;
        };
        Some(Self { a, b })
    }

    /// Whether the 1-based `position` is selected.
    #[must_use]
    pub const fn matches(self, position: i64) -> bool {
        let difference = position - self.b;
        if self.a == 0 {
            return difference == 0;
        }
        difference % self.a == 0 && difference / self.a >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selected(pattern: &str) -> Vec<i64> {
        let nth = Nth::parse(pattern).unwrap();
        (1..=10).filter(|&p| nth.matches(p)).collect()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(selected("odd"), [1, 3, 5, 7, 9]);
        assert_eq!(selected("even"), [2, 4, 6, 8, 10]);
    }

    #[test]
    fn test_forms() {
        assert_eq!(selected("3"), [3]);
        assert_eq!(selected("n"), (1..=10).collect::<Vec<_>>());
        assert_eq!(selected("3n"), [3, 6, 9]);
        assert_eq!(selected("2n+1"), [1, 3, 5, 7, 9]);
        assert_eq!(selected("3n-1"), [2, 5, 8]);
        assert_eq!(selected("-n+3"), [1, 2, 3]);
        assert_eq!(selected("- 2n + 5"), [1, 3, 5]);
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(Nth::parse("first"), None);
        assert_eq!(Nth::parse("2n1"), None);
        assert_eq!(Nth::parse(""), None);
    }
}
