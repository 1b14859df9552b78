/// What the lexer is in the middle of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Comment,
    XmlComment,
    Quote,
    DoubleQuote,
    Variable,
    Identifier,
    Number,
    Whitespace,
    HexNumber,
}

/// Splits CSS source into string tokens.
///
/// Tokens are identifiers (including `--custom` names), numbers, quoted
/// strings with their quotes, the hex digits following `#`, a single `" "`
/// for every run of whitespace, and single characters for everything else.
/// Comments (`/* */` and `<!-- -->`) are dropped.
///
/// # Example
/// ```
/// use wombat_css::tokenize;
///
/// assert_eq!(tokenize("a { color:#f00 }"), ["a", " ", "{", " ", "color", ":", "#", "f00", " ", "}"]);
/// ```
pub struct CssTokenizer {
    input: Vec<char>,
    position: usize,
    context: Option<Context>,
    /// Token being accumulated.
    pending: String,
    tokens: Vec<String>,
}

impl CssTokenizer {
    /// Create a new CSS tokenizer with the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            context: None,
            pending: String::new(),
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input.
    pub fn run(&mut self) {
        while let Some(c) = self.peek() {
            match self.context {
                Some(Context::Comment) => {
                    if self.starts_with("*/") {
                        self.position += 2;
                        self.context = None;
                    } else {
                        self.position += 1;
                    }
                }
                Some(Context::XmlComment) => {
                    if self.starts_with("-->") {
                        self.position += 3;
                        self.context = None;
                    } else {
                        self.position += 1;
                    }
                }
                Some(Context::Quote) => {
                    self.position += 1;
                    match c {
                        '\\' => {
                            self.pending.push('\\');
                            if let Some(escaped) = self.peek() {
                                self.pending.push(escaped);
                                self.position += 1;
                            }
                        }
                        '\'' => self.finish_string('\''),
                        _ => self.pending.push(c),
                    }
                }
                Some(Context::DoubleQuote) => {
                    self.position += 1;
                    match c {
                        '\\' => {
                            self.pending.push('\\');
                            if let Some(escaped) = self.peek() {
                                self.pending.push(escaped);
                                self.position += 1;
                            }
                        }
                        '"' => self.finish_string('"'),
                        _ => self.pending.push(c),
                    }
                }
                Some(Context::Identifier | Context::Variable | Context::HexNumber)
                    if is_ident_char(c) =>
                {
                    self.pending.push(c);
                    self.position += 1;
                }
                Some(Context::Number) if c.is_ascii_digit() || c == '.' => {
                    self.pending.push(c);
                    self.position += 1;
                }
                Some(Context::Identifier | Context::Variable | Context::HexNumber | Context::Number) => {
                    self.flush();
                    self.context = None;
                }
                None | Some(Context::Whitespace) => self.start_token(c),
            }
        }

        match self.context {
            Some(Context::Quote) => self.finish_string('\''),
            Some(Context::DoubleQuote) => self.finish_string('"'),
            _ => self.flush(),
        }
        self.context = None;
    }

    /// Return the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<String> {
        self.tokens
    }

    /// Return a reference to the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn starts_with(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.input.get(self.position + i) == Some(&c))
    }

    fn emit(&mut self, token: String) {
        self.tokens.push(token);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            let token = std::mem::take(&mut self.pending);
            self.emit(token);
        }
    }

    fn finish_string(&mut self, quote: char) {
        let body = std::mem::take(&mut self.pending);
        let body = if quote == '"' { unescape(&body) } else { body };
        self.emit(format!("{quote}{body}{quote}"));
        self.context = None;
    }

    fn start_token(&mut self, c: char) {
        if self.starts_with("/*") {
            self.context = Some(Context::Comment);
            self.position += 2;
        } else if self.starts_with("<!--") {
            self.context = Some(Context::XmlComment);
            self.position += 4;
        } else if c == '\'' {
            self.context = Some(Context::Quote);
            self.position += 1;
        } else if c == '"' {
            self.context = Some(Context::DoubleQuote);
            self.position += 1;
        } else if self.starts_with("--") {
            self.context = Some(Context::Variable);
            self.pending.push_str("--");
            self.position += 2;
        } else if is_ident_start(c) {
            self.context = Some(Context::Identifier);
            self.pending.push(c);
            self.position += 1;
        } else if c.is_ascii_digit() {
            self.context = Some(Context::Number);
            self.pending.push(c);
            self.position += 1;
        } else if matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000C}') {
            if self.tokens.last().is_none_or(|last| last != " ") {
                self.emit(" ".to_owned());
            }
            self.context = Some(Context::Whitespace);
            self.position += 1;
        } else if c == '#' {
            self.emit("#".to_owned());
            self.context = Some(Context::HexNumber);
            self.position += 1;
        } else {
            self.context = None;
            self.emit(c.to_string());
            self.position += 1;
        }
    }
}

/// [§ 4.3.7 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
///
/// "Consume as many hex digits as possible, but no more than 5. ... If the
/// next input code point is whitespace, consume it as well."
///
/// Escaped quotes and backslashes stay escaped so the token still parses.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(&d) if d.is_ascii_hexdigit() => {
                    hex.push(d);
                    let _ = chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            if let Some(escaped) = chars.next() {
                out.push('\\');
                out.push(escaped);
            }
            continue;
        }
        if chars.peek() == Some(&' ') {
            let _ = chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or('\u{FFFD}');
        if matches!(decoded, '"' | '\\') {
            out.push('\\');
        }
        out.push(decoded);
    }
    out
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// Tokenize `text`.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokenizer = CssTokenizer::new(text);
    tokenizer.run();
    tokenizer.into_tokens()
}

/// Concatenate tokens back into source text.
#[must_use]
pub fn detokenize<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens.iter().map(AsRef::as_ref).collect()
}
