//! PDF Content Stream Parser
//!
//! Content streams are sequences of operands followed by the operator that
//! consumes them. The tokenizer here splits the raw bytes into tokens and the
//! [`ContentParser`] assembles operand tokens into [`Object`] values, leaving
//! the interpretation of operators to the canvas.

use super::{ParseError, ParseResult};
use crate::objects::{Array, Dictionary, Object};
use rust_decimal::Decimal;
use std::str::FromStr;

/// One element of a content stream.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Operand(Object),
    Operator(String),
}

/// Token types in content streams
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Token {
    Number(Decimal),
    Boolean(bool),
    Null,
    String(Vec<u8>),
    HexString(Vec<u8>),
    Name(String),
    Operator(String),
    /// Raw bytes between `ID` and `EI`.
    InlineData(Vec<u8>),
    ArrayStart,
    ArrayEnd,
    DictStart,
    DictEnd,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => n.to_string(),
            Token::Boolean(b) => b.to_string(),
            Token::Null => "null".to_string(),
            Token::String(_) => "string".to_string(),
            Token::HexString(_) => "hex string".to_string(),
            Token::Name(n) => format!("/{n}"),
            Token::Operator(op) => op.clone(),
            Token::InlineData(_) => "inline image data".to_string(),
            Token::ArrayStart => "[".to_string(),
            Token::ArrayEnd => "]".to_string(),
            Token::DictStart => "<<".to_string(),
            Token::DictEnd => ">>".to_string(),
        }
    }
}

fn is_whitespace(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\r' | b'\n' | b'\x0C' | b'\0')
}

fn is_delimiter(ch: u8) -> bool {
    matches!(
        ch,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

/// Content stream tokenizer
pub struct ContentTokenizer<'a> {
    input: &'a [u8],
    position: usize,
    inline_data_pending: bool,
}

impl<'a> ContentTokenizer<'a> {
    /// Create a new tokenizer for the given input
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            inline_data_pending: false,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the next token from the stream
    pub(super) fn next_token(&mut self) -> ParseResult<Option<Token>> {
        if self.inline_data_pending {
            self.inline_data_pending = false;
            return self.read_inline_data();
        }

        self.skip_whitespace();

        if self.position >= self.input.len() {
            return Ok(None);
        }

        let ch = self.input[self.position];

        match ch {
            // Numbers
            b'+' | b'-' | b'.' | b'0'..=b'9' => self.read_number(),

            // Strings
            b'(' => self.read_literal_string(),
            b'<' => {
                if self.peek_next() == Some(b'<') {
                    self.position += 2;
                    Ok(Some(Token::DictStart))
                } else {
                    self.read_hex_string()
                }
            }
            b'>' => {
                if self.peek_next() == Some(b'>') {
                    self.position += 2;
                    Ok(Some(Token::DictEnd))
                } else {
                    Err(ParseError::SyntaxError {
                        position: self.position,
                        message: "Unexpected '>'".to_string(),
                    })
                }
            }

            // Arrays
            b'[' => {
                self.position += 1;
                Ok(Some(Token::ArrayStart))
            }
            b']' => {
                self.position += 1;
                Ok(Some(Token::ArrayEnd))
            }

            // Names
            b'/' => self.read_name(),

            b')' | b'{' | b'}' => Err(ParseError::SyntaxError {
                position: self.position,
                message: format!("Unexpected '{}'", ch as char),
            }),

            // Operators and keywords
            _ => self.read_operator(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() {
            match self.input[self.position] {
                ch if is_whitespace(ch) => self.position += 1,
                b'%' => self.skip_comment(),
                _ => break,
            }
        }
    }

    fn skip_comment(&mut self) {
        while self.position < self.input.len()
            && self.input[self.position] != b'\n'
            && self.input[self.position] != b'\r'
        {
            self.position += 1;
        }
    }

    fn peek_next(&self) -> Option<u8> {
        self.input.get(self.position + 1).copied()
    }

    fn read_number(&mut self) -> ParseResult<Option<Token>> {
        let start = self.position;
        let mut has_dot = false;

        // Handle optional sign
        if matches!(self.input[self.position], b'+' | b'-') {
            self.position += 1;
        }

        // Read digits and optional decimal point
        while self.position < self.input.len() {
            match self.input[self.position] {
                b'0'..=b'9' => self.position += 1,
                b'.' if !has_dot => {
                    has_dot = true;
                    self.position += 1;
                }
                _ => break,
            }
        }

        let text = std::str::from_utf8(&self.input[start..self.position]).map_err(|_| {
            ParseError::SyntaxError {
                position: start,
                message: "Invalid number format".to_string(),
            }
        })?;

        let value = parse_decimal(text).ok_or_else(|| ParseError::SyntaxError {
            position: start,
            message: format!("Invalid number: {text:?}"),
        })?;
        Ok(Some(Token::Number(value)))
    }

    fn read_literal_string(&mut self) -> ParseResult<Option<Token>> {
        let start = self.position;
        self.position += 1; // Skip opening '('
        let mut result = Vec::new();
        let mut paren_depth = 1;
        let mut escape = false;

        while self.position < self.input.len() {
            let ch = self.input[self.position];
            self.position += 1;

            if escape {
                match ch {
                    b'n' => result.push(b'\n'),
                    b'r' => result.push(b'\r'),
                    b't' => result.push(b'\t'),
                    b'b' => result.push(b'\x08'),
                    b'f' => result.push(b'\x0C'),
                    b'(' => result.push(b'('),
                    b')' => result.push(b')'),
                    b'\\' => result.push(b'\\'),
                    // Line continuation
                    b'\n' => {}
                    b'\r' => {
                        if self.input.get(self.position) == Some(&b'\n') {
                            self.position += 1;
                        }
                    }
                    b'0'..=b'7' => {
                        self.position -= 1;
                        result.push(self.read_octal_escape());
                    }
                    _ => result.push(ch), // Unknown escape, treat as literal
                }
                escape = false;
            } else {
                match ch {
                    b'\\' => escape = true,
                    b'(' => {
                        paren_depth += 1;
                        result.push(ch);
                    }
                    b')' => {
                        paren_depth -= 1;
                        if paren_depth == 0 {
                            return Ok(Some(Token::String(result)));
                        }
                        result.push(ch);
                    }
                    _ => result.push(ch),
                }
            }
        }

        Err(ParseError::SyntaxError {
            position: start,
            message: "Unterminated literal string".to_string(),
        })
    }

    fn read_octal_escape(&mut self) -> u8 {
        let mut value = 0u8;
        let mut count = 0;

        while count < 3 && self.position < self.input.len() {
            match self.input[self.position] {
                digit @ b'0'..=b'7' => {
                    value = value.wrapping_mul(8).wrapping_add(digit - b'0');
                    self.position += 1;
                    count += 1;
                }
                _ => break,
            }
        }

        value
    }

    fn read_hex_string(&mut self) -> ParseResult<Option<Token>> {
        self.position += 1; // Skip opening '<'
        let mut result = Vec::new();
        let mut nibble = None;

        while self.position < self.input.len() {
            let ch = self.input[self.position];

            match ch {
                b'>' => {
                    self.position += 1;
                    // Odd number of digits: the last one is followed by 0
                    if let Some(n) = nibble {
                        result.push(n << 4);
                    }
                    return Ok(Some(Token::HexString(result)));
                }
                b'0'..=b'9' | b'A'..=b'F' | b'a'..=b'f' => {
                    let digit = if ch <= b'9' {
                        ch - b'0'
                    } else if ch <= b'F' {
                        ch - b'A' + 10
                    } else {
                        ch - b'a' + 10
                    };

                    if let Some(n) = nibble {
                        result.push((n << 4) | digit);
                        nibble = None;
                    } else {
                        nibble = Some(digit);
                    }
                    self.position += 1;
                }
                ch if is_whitespace(ch) => self.position += 1,
                _ => {
                    return Err(ParseError::SyntaxError {
                        position: self.position,
                        message: format!("Invalid character in hex string: {:?}", ch as char),
                    });
                }
            }
        }

        Err(ParseError::SyntaxError {
            position: self.position,
            message: "Unterminated hex string".to_string(),
        })
    }

    fn read_name(&mut self) -> ParseResult<Option<Token>> {
        self.position += 1; // Skip '/'
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.input[self.position];
            if is_whitespace(ch) || is_delimiter(ch) {
                break;
            }
            self.position += 1;
        }

        let name = self.decode_name(start)?;
        Ok(Some(Token::Name(name)))
    }

    fn decode_name(&self, start: usize) -> ParseResult<String> {
        let bytes = &self.input[start..self.position];
        let mut result = Vec::with_capacity(bytes.len());
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'#' && i + 2 < bytes.len() {
                let value = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                    .ok_or_else(|| ParseError::SyntaxError {
                        position: start + i,
                        message: "Invalid hex escape in name".to_string(),
                    })?;
                result.push(value);
                i += 3;
            } else {
                result.push(bytes[i]);
                i += 1;
            }
        }

        String::from_utf8(result).map_err(|_| ParseError::SyntaxError {
            position: start,
            message: "Invalid UTF-8 in name".to_string(),
        })
    }

    fn read_operator(&mut self) -> ParseResult<Option<Token>> {
        let start = self.position;

        while self.position < self.input.len() {
            let ch = self.input[self.position];
            if is_whitespace(ch) || is_delimiter(ch) {
                break;
            }
            self.position += 1;
        }

        let op = std::str::from_utf8(&self.input[start..self.position]).map_err(|_| {
            ParseError::SyntaxError {
                position: start,
                message: "Invalid operator".to_string(),
            }
        })?;

        let token = match op {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "ID" => {
                self.inline_data_pending = true;
                Token::Operator(op.to_string())
            }
            _ => Token::Operator(op.to_string()),
        };
        Ok(Some(token))
    }

    /// Reads the raw bytes of an inline image, up to the whitespace before `EI`.
    fn read_inline_data(&mut self) -> ParseResult<Option<Token>> {
        // A single whitespace byte separates ID from the data
        if self
            .input
            .get(self.position)
            .is_some_and(|&ch| is_whitespace(ch))
        {
            self.position += 1;
        }
        let start = self.position;
        let mut cursor = start;

        while cursor < self.input.len() {
            let ends_here = is_whitespace(self.input[cursor])
                && self.input[cursor + 1..].starts_with(b"EI")
                && self
                    .input
                    .get(cursor + 3)
                    .map_or(true, |&ch| is_whitespace(ch) || is_delimiter(ch));
            if ends_here {
                let data = self.input[start..cursor].to_vec();
                self.position = cursor + 1;
                return Ok(Some(Token::InlineData(data)));
            }
            cursor += 1;
        }

        Err(ParseError::SyntaxError {
            position: start,
            message: "Inline image data without EI".to_string(),
        })
    }
}

/// Parses a PDF number. Forms like `.5`, `-.5` and `5.` are accepted.
fn parse_decimal(text: &str) -> Option<Decimal> {
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || digits == "." {
        return None;
    }

    let mut normalized = String::with_capacity(digits.len() + 2);
    if digits.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(digits);
    if digits.ends_with('.') {
        normalized.push('0');
    }

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Content stream parser
///
/// Yields operands and operators in stream order. Arrays and dictionaries
/// are assembled into single operands.
pub struct ContentParser<'a> {
    tokenizer: ContentTokenizer<'a>,
}

impl<'a> ContentParser<'a> {
    pub fn new(content: &'a [u8]) -> Self {
        Self {
            tokenizer: ContentTokenizer::new(content),
        }
    }

    /// Parse a whole content stream into items
    pub fn parse(content: &[u8]) -> ParseResult<Vec<ContentItem>> {
        ContentParser::new(content).collect()
    }

    pub fn next_item(&mut self) -> ParseResult<Option<ContentItem>> {
        let Some(token) = self.tokenizer.next_token()? else {
            return Ok(None);
        };
        match token {
            Token::Operator(op) => Ok(Some(ContentItem::Operator(op))),
            token => self.object_from(token).map(|obj| Some(ContentItem::Operand(obj))),
        }
    }

    fn next_object(&mut self) -> ParseResult<Object> {
        let token = self.tokenizer.next_token()?.ok_or(ParseError::UnexpectedEof)?;
        self.object_from(token)
    }

    fn object_from(&mut self, token: Token) -> ParseResult<Object> {
        match token {
            Token::Number(n) => Ok(Object::Number(n)),
            Token::Boolean(b) => Ok(Object::Boolean(b)),
            Token::Null => Ok(Object::Null),
            Token::String(s) | Token::InlineData(s) => Ok(Object::String(s)),
            Token::HexString(s) => Ok(Object::HexString(s)),
            Token::Name(n) => Ok(Object::Name(n)),
            Token::ArrayStart => self.read_array(),
            Token::DictStart => self.read_dictionary(),
            other => Err(ParseError::UnexpectedToken {
                expected: "operand".to_string(),
                found: other.describe(),
            }),
        }
    }

    fn read_array(&mut self) -> ParseResult<Object> {
        let mut array = Array::new();
        loop {
            let token = self.tokenizer.next_token()?.ok_or(ParseError::UnexpectedEof)?;
            if token == Token::ArrayEnd {
                return Ok(Object::Array(array));
            }
            array.push(self.object_from(token)?);
        }
    }

    fn read_dictionary(&mut self) -> ParseResult<Object> {
        let mut dict = Dictionary::new();
        loop {
            match self.tokenizer.next_token()?.ok_or(ParseError::UnexpectedEof)? {
                Token::DictEnd => return Ok(Object::Dictionary(dict)),
                Token::Name(key) => {
                    let value = self.next_object()?;
                    dict.set(key, value);
                }
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "name".to_string(),
                        found: other.describe(),
                    })
                }
            }
        }
    }
}

impl Iterator for ContentParser<'_> {
    type Item = ParseResult<ContentItem>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_item().transpose()
    }
}

/// Parses exactly one value, as written by the serializer.
pub fn parse_object(bytes: &[u8]) -> ParseResult<Object> {
    let mut parser = ContentParser::new(bytes);
    let object = parser.next_object()?;
    match parser.tokenizer.next_token()? {
        None => Ok(object),
        Some(extra) => Err(ParseError::SyntaxError {
            position: parser.tokenizer.position(),
            message: format!("Trailing content after value: {}", extra.describe()),
        }),
    }
}
