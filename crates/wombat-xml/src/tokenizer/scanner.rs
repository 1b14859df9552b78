use strum_macros::Display;

use super::entities::decode;
use super::token::{Attribute, Token};
use crate::parser::ParseIssue;

/// Which grammar the tokenizer and tree builder enforce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Mode {
    /// [XML 1.0](https://www.w3.org/TR/xml/): well-formedness violations are errors.
    #[strum(serialize = "xml")]
    Xml,
    /// Lenient HTML: names are case-folded, attributes may be unquoted or
    /// valueless, `script`/`style` contents are raw text.
    #[strum(serialize = "tag-soup")]
    TagSoup,
}

/// Elements whose content is not parsed as markup in tag-soup mode.
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Elements whose content is text with character references in tag-soup mode.
const ESCAPABLE_RAW_TEXT_ELEMENTS: [&str; 2] = ["textarea", "title"];

/// Splits XML or HTML source into [`Token`]s.
///
/// # Example
/// ```
/// use wombat_xml::{Mode, Token, XmlTokenizer};
///
/// let mut tokenizer = XmlTokenizer::new("<a href='x'/>", Mode::Xml);
/// tokenizer.run();
/// let tokens = tokenizer.into_tokens();
/// assert!(matches!(&tokens[0], Token::StartTag { name, self_closing: true, .. } if name == "a"));
/// ```
pub struct XmlTokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    mode: Mode,
    tokens: Vec<Token>,
    /// Line each token started on, parallel to `tokens`.
    lines: Vec<usize>,
    issues: Vec<ParseIssue>,
}

impl XmlTokenizer {
    /// Create a new tokenizer for the given input.
    pub fn new(input: impl Into<String>, mode: Mode) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            line: 1,
            mode,
            tokens: Vec::new(),
            lines: Vec::new(),
            issues: Vec::new(),
        }
    }

    /// Tokenize the whole input. The last token is always [`Token::EndOfFile`].
    pub fn run(&mut self) {
        // A byte order mark is not content.
        if self.peek() == Some('\u{FEFF}') {
            let _ = self.bump();
        }

        while let Some(c) = self.peek() {
            let line = self.line;
            if c == '<' {
                self.consume_markup(line);
            } else {
                self.consume_text(line);
            }
        }
        let line = self.line;
        self.emit(Token::EndOfFile, line);
    }

    /// Consume the tokenizer and return the token stream.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Consume the tokenizer and return tokens, their line numbers and issues.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Token>, Vec<usize>, Vec<ParseIssue>) {
        (self.tokens, self.lines, self.issues)
    }

    /// Get the tokens produced so far.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Get the issues reported so far.
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    // ========== input helpers ==========

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn starts_with(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn starts_with_ignore_case(&self, literal: &str) -> bool {
        literal
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn skip(&mut self, count: usize) {
        for _ in 0..count {
            let _ = self.bump();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            let _ = self.bump();
        }
    }

    /// Consume up to and including `terminator`, returning what came before.
    /// Returns `None` (having consumed the rest of the input) at EOF.
    fn consume_until(&mut self, terminator: &str) -> Option<String> {
        let mut text = String::new();
        loop {
            if self.starts_with(terminator) {
                self.skip(terminator.chars().count());
                return Some(text);
            }
            text.push(self.bump()?);
        }
    }

    fn emit(&mut self, token: Token, line: usize) {
        self.tokens.push(token);
        self.lines.push(line);
    }

    fn report(&mut self, message: impl Into<String>, is_error: bool) {
        self.issues.push(ParseIssue {
            message: message.into(),
            line: self.line,
            is_error: is_error && self.mode == Mode::Xml,
        });
    }

    fn fold(&self, name: String) -> String {
        match self.mode {
            Mode::Xml => name,
            Mode::TagSoup => name.to_ascii_lowercase(),
        }
    }

    // ========== content ==========

    /// [§ 2.4 Character Data](https://www.w3.org/TR/xml/#syntax)
    fn consume_text(&mut self, line: usize) {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            raw.push(c);
            let _ = self.bump();
        }
        self.emit_text(&raw, line);
    }

    fn emit_text(&mut self, raw: &str, line: usize) {
        let (text, bad) = decode(raw, self.mode);
        if bad {
            self.report("unresolved character reference", true);
        }
        self.emit(Token::Text(text), line);
    }

    fn consume_markup(&mut self, line: usize) {
        // [§ 2.5 Comments](https://www.w3.org/TR/xml/#sec-comments)
        if self.starts_with("<!--") {
            self.skip(4);
            let text = self.consume_until("-->").unwrap_or_else(|| {
                self.report("unterminated comment", true);
                String::new()
            });
            self.emit(Token::Comment(text), line);
            return;
        }

        // [§ 2.7 CDATA Sections](https://www.w3.org/TR/xml/#sec-cdata-sect)
        // "CDATA sections may occur anywhere character data may occur"
        if self.starts_with("<![CDATA[") {
            self.skip(9);
            let text = self.consume_until("]]>").unwrap_or_else(|| {
                self.report("unterminated CDATA section", true);
                String::new()
            });
            self.emit(Token::Text(text), line);
            return;
        }

        // [§ 2.8 Document Type Declaration](https://www.w3.org/TR/xml/#sec-prolog-dtd)
        if self.starts_with("<!") {
            self.skip(2);
            let declaration = self.consume_declaration();
            self.emit(Token::Doctype(declaration), line);
            return;
        }

        // [§ 2.6 Processing Instructions](https://www.w3.org/TR/xml/#sec-pi)
        if self.starts_with("<?") {
            self.skip(2);
            self.consume_processing_instruction(line);
            return;
        }

        if self.starts_with("</") {
            self.skip(2);
            self.consume_end_tag(line);
            return;
        }

        if self.peek_at(1).is_some_and(is_name_start) {
            let _ = self.bump();
            self.consume_start_tag(line);
            return;
        }

        // A lone '<' is text in tag soup and an error in XML.
        self.report("'<' not followed by a tag name", true);
        let _ = self.bump();
        let mut raw = String::from('<');
        while let Some(c) = self.peek() {
            if c == '<' {
                break;
            }
            raw.push(c);
            let _ = self.bump();
        }
        self.emit_text(&raw, line);
    }

    /// Skip a `<!...>` declaration, honoring a bracketed internal subset.
    fn consume_declaration(&mut self) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '[' => depth += 1,
                ']' => depth = depth.saturating_sub(1),
                '>' if depth == 0 => return text,
                _ => {}
            }
            text.push(c);
        }
        self.report("unterminated declaration", true);
        text
    }

    fn consume_processing_instruction(&mut self, line: usize) {
        let target = self.consume_name();
        if target.is_empty() {
            self.report("processing instruction without target", true);
        }
        self.skip_whitespace();
        let data = self.consume_until("?>").unwrap_or_else(|| {
            self.report("unterminated processing instruction", true);
            String::new()
        });
        self.emit(
            Token::ProcessingInstruction {
                target,
                data: data.trim_end().to_owned(),
            },
            line,
        );
    }

    /// [§ 3.1 End-Tags](https://www.w3.org/TR/xml/#NT-ETag)
    /// "ETag ::= '</' Name S? '>'"
    fn consume_end_tag(&mut self, line: usize) {
        let name = self.consume_name();
        let name = self.fold(name);
        if self.consume_until(">").is_none() {
            self.report(format!("unterminated end tag </{name}"), true);
        }
        if name.is_empty() {
            self.report("end tag without a name", true);
            return;
        }
        self.emit(Token::EndTag { name }, line);
    }

    /// [§ 3.1 Start-Tags](https://www.w3.org/TR/xml/#NT-STag)
    /// "STag ::= '<' Name (S Attribute)* S? '>'"
    /// "EmptyElemTag ::= '<' Name (S Attribute)* S? '/>'"
    fn consume_start_tag(&mut self, line: usize) {
        let name = self.consume_name();
        let name = self.fold(name);
        let mut attributes: Vec<Attribute> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    self.report(format!("unterminated start tag <{name}"), true);
                    break;
                }
                Some('>') => {
                    let _ = self.bump();
                    break;
                }
                Some('/') if self.peek_at(1) == Some('>') => {
                    self.skip(2);
                    self_closing = true;
                    break;
                }
                Some('/') => {
                    self.report("stray '/' in start tag", true);
                    let _ = self.bump();
                }
                Some(_) => {
                    let Some(attribute) = self.consume_attribute() else {
                        continue;
                    };
                    if attributes.iter().any(|a| a.name == attribute.name) {
                        self.report(format!("duplicate attribute {}", attribute.name), true);
                    } else {
                        attributes.push(attribute);
                    }
                }
            }
        }

        let raw_text = self.mode == Mode::TagSoup
            && !self_closing
            && (RAW_TEXT_ELEMENTS.contains(&name.as_str())
                || ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str()));
        let escapable = ESCAPABLE_RAW_TEXT_ELEMENTS.contains(&name.as_str());

        self.emit(
            Token::StartTag {
                name: name.clone(),
                attributes,
                self_closing,
            },
            line,
        );

        if raw_text {
            self.consume_raw_text(&name, escapable);
        }
    }

    /// [§ 3.1 Attribute](https://www.w3.org/TR/xml/#NT-Attribute)
    fn consume_attribute(&mut self) -> Option<Attribute> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '=' || c == '>' || (c == '/' && self.peek_at(1) == Some('>')) {
                break;
            }
            name.push(c);
            let _ = self.bump();
        }
        if name.is_empty() {
            // '=' with no name before it
            self.report("attribute without a name", true);
            let _ = self.bump();
            return None;
        }
        let name = self.fold(name);

        self.skip_whitespace();
        if self.peek() != Some('=') {
            self.report(format!("attribute {name} has no value"), true);
            return Some(Attribute::new(name, String::new()));
        }
        let _ = self.bump();
        self.skip_whitespace();

        let raw = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                let _ = self.bump();
                let mut value = String::new();
                loop {
                    match self.bump() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => {
                            self.report(format!("unterminated value for attribute {name}"), true);
                            break;
                        }
                    }
                }
                value
            }
            _ => {
                self.report(format!("unquoted value for attribute {name}"), true);
                let mut value = String::new();
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    let _ = self.bump();
                }
                value
            }
        };

        let (value, bad) = decode(&raw, self.mode);
        if bad {
            self.report(format!("unresolved character reference in attribute {name}"), true);
        }
        Some(Attribute::new(name, value))
    }

    /// Consume the content of a raw text element up to its end tag, which is
    /// left in the input for the regular end tag path.
    fn consume_raw_text(&mut self, name: &str, escapable: bool) {
        let line = self.line;
        let closing = format!("</{name}");
        let mut raw = String::new();
        while self.peek().is_some() && !self.starts_with_ignore_case(&closing) {
            if let Some(c) = self.bump() {
                raw.push(c);
            }
        }
        if raw.is_empty() {
            return;
        }
        if escapable {
            self.emit_text(&raw, line);
        } else {
            self.emit(Token::Text(raw), line);
        }
    }

    /// [§ 2.3 Names](https://www.w3.org/TR/xml/#NT-Name)
    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            let _ = self.bump();
        }
        name
    }
}

/// [§ 2.3](https://www.w3.org/TR/xml/#NT-NameStartChar)
fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

/// [§ 2.3](https://www.w3.org/TR/xml/#NT-NameChar)
fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_alphanumeric() || matches!(c, '-' | '.' | '\u{B7}')
}
