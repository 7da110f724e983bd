//! Purpose: Tokenize literal expressions found inside brace spans.
//! Exports: `Token`, `Lexer`, `LexError`.
//! Role: Byte-cursor tokenizer feeding the recursive-descent literal parser.
//! Invariants: Input is valid UTF-8; the cursor never splits a multi-byte character.
//! Invariants: Anything outside the literal notation is a typed error, never a panic.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    LeftParen,
    RightParen,
    Colon,
    Comma,
    Plus,
    Minus,
    Int(i128),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    True,
    False,
    None,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub offset: usize,
}

impl LexError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0c => self.pos += 1,
                _ => break,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(b) = self.peek_byte() else {
            return Ok(Token::Eof);
        };
        match b {
            b'{' => self.punct(Token::LeftBrace),
            b'}' => self.punct(Token::RightBrace),
            b'[' => self.punct(Token::LeftBracket),
            b']' => self.punct(Token::RightBracket),
            b'(' => self.punct(Token::LeftParen),
            b')' => self.punct(Token::RightParen),
            b':' => self.punct(Token::Colon),
            b',' => self.punct(Token::Comma),
            b'+' => self.punct(Token::Plus),
            b'-' => self.punct(Token::Minus),
            b'\'' | b'"' => self.lex_string(start, false, false),
            b'0'..=b'9' => self.lex_number(start),
            b'.' => {
                if self.byte_at(1).is_some_and(|nb| nb.is_ascii_digit()) {
                    self.lex_number(start)
                } else {
                    Err(LexError::new("unexpected character '.'", start))
                }
            }
            _ if b.is_ascii_alphabetic() || b == b'_' => self.lex_word(start),
            _ => {
                let ch = self.peek_char().unwrap_or('\u{fffd}');
                Err(LexError::new(
                    format!("unexpected character {ch:?}"),
                    start,
                ))
            }
        }
    }

    fn punct(&mut self, token: Token) -> Result<Token, LexError> {
        self.pos += 1;
        Ok(token)
    }

    fn lex_word(&mut self, start: usize) -> Result<Token, LexError> {
        while let Some(b) = self.peek_byte() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        let word = &self.input[start..self.pos];

        if matches!(self.peek_byte(), Some(b'\'') | Some(b'"')) {
            return match word.to_ascii_lowercase().as_str() {
                "u" => self.lex_string(start, false, false),
                "r" => self.lex_string(start, false, true),
                "b" => self.lex_string(start, true, false),
                "rb" | "br" => self.lex_string(start, true, true),
                lower if lower.contains('f') => Err(LexError::new(
                    "format string literals are not supported",
                    start,
                )),
                _ => Err(LexError::new(
                    format!("invalid string prefix {word:?}"),
                    start,
                )),
            };
        }

        match word {
            "True" => Ok(Token::True),
            "False" => Ok(Token::False),
            "None" => Ok(Token::None),
            _ => Err(LexError::new(
                format!("unexpected identifier {word:?}"),
                start,
            )),
        }
    }

    // Digit run for the given radix, validating underscore placement. An
    // underscore is allowed right after a radix prefix when
    // `after_radix_prefix` is set, otherwise only between digits.
    fn collect_digits(
        &mut self,
        radix: u32,
        after_radix_prefix: bool,
    ) -> Result<String, LexError> {
        let mut digits = String::new();
        let mut at_prefix = after_radix_prefix;
        loop {
            let Some(b) = self.peek_byte() else { break };
            let ch = b as char;
            if ch.is_digit(radix) {
                digits.push(ch);
                self.pos += 1;
                at_prefix = false;
                continue;
            }
            if b == b'_' {
                let prev_is_digit = digits
                    .chars()
                    .next_back()
                    .is_some_and(|last| last.is_digit(radix));
                let next_is_digit = self
                    .byte_at(1)
                    .is_some_and(|nb| (nb as char).is_digit(radix));
                if (prev_is_digit || at_prefix) && next_is_digit {
                    self.pos += 1;
                    at_prefix = false;
                    continue;
                }
                return Err(LexError::new(
                    "invalid underscore in numeric literal",
                    self.pos,
                ));
            }
            break;
        }
        Ok(digits)
    }

    fn reject_imaginary(&self, start: usize) -> Result<(), LexError> {
        if matches!(self.peek_byte(), Some(b'j') | Some(b'J')) {
            return Err(LexError::new("complex literals are not supported", start));
        }
        Ok(())
    }

    fn lex_number(&mut self, start: usize) -> Result<Token, LexError> {
        if self.peek_byte() == Some(b'0') {
            let radix = match self.byte_at(1) {
                Some(b'x') | Some(b'X') => Some(16),
                Some(b'o') | Some(b'O') => Some(8),
                Some(b'b') | Some(b'B') => Some(2),
                _ => Option::None,
            };
            if let Some(radix) = radix {
                self.pos += 2;
                let digits = self.collect_digits(radix, true)?;
                if digits.is_empty() {
                    return Err(LexError::new("invalid numeric literal", start));
                }
                self.reject_imaginary(start)?;
                let value = i128::from_str_radix(&digits, radix).map_err(|_| {
                    LexError::new("integer literal out of supported range", start)
                })?;
                return Ok(Token::Int(value));
            }
        }

        let int_digits = self.collect_digits(10, false)?;
        let mut frac_digits = String::new();
        let mut exponent = String::new();
        let mut is_float = false;

        if self.peek_byte() == Some(b'.') {
            self.pos += 1;
            is_float = true;
            frac_digits = self.collect_digits(10, false)?;
        }

        if matches!(self.peek_byte(), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            is_float = true;
            if let Some(sign @ (b'+' | b'-')) = self.peek_byte() {
                exponent.push(sign as char);
                self.pos += 1;
            }
            let exp_digits = self.collect_digits(10, false)?;
            if exp_digits.is_empty() {
                return Err(LexError::new("invalid float exponent", start));
            }
            exponent.push_str(&exp_digits);
        }

        self.reject_imaginary(start)?;

        if !is_float {
            if int_digits.len() > 1
                && int_digits.starts_with('0')
                && int_digits.chars().any(|c| c != '0')
            {
                return Err(LexError::new(
                    "leading zeros in decimal integer literal",
                    start,
                ));
            }
            let value = int_digits
                .parse::<i128>()
                .map_err(|_| LexError::new("integer literal out of supported range", start))?;
            return Ok(Token::Int(value));
        }

        let int_part = if int_digits.is_empty() { "0" } else { &int_digits };
        let frac_part = if frac_digits.is_empty() { "0" } else { &frac_digits };
        let mut normalized = format!("{int_part}.{frac_part}");
        if !exponent.is_empty() {
            normalized.push('e');
            normalized.push_str(&exponent);
        }
        let value = normalized
            .parse::<f64>()
            .map_err(|_| LexError::new("invalid float literal", start))?;
        Ok(Token::Float(value))
    }

    fn lex_string(&mut self, start: usize, bytes_mode: bool, raw: bool) -> Result<Token, LexError> {
        let quote = match self.peek_byte() {
            Some(q @ (b'\'' | b'"')) => q,
            _ => return Err(LexError::new("expected string quote", self.pos)),
        };
        self.pos += 1;
        let triple = self.peek_byte() == Some(quote) && self.byte_at(1) == Some(quote);
        if triple {
            self.pos += 2;
        }
        let quote_char = quote as char;

        let mut text = String::new();
        let mut data = Vec::new();
        let mut push_char = |ch: char, text: &mut String, data: &mut Vec<u8>| {
            if bytes_mode {
                data.push(ch as u8);
            } else {
                text.push(ch);
            }
        };

        loop {
            let Some(ch) = self.peek_char() else {
                return Err(LexError::new("unterminated string literal", start));
            };
            if ch == quote_char {
                self.pos += 1;
                if !triple {
                    break;
                }
                if self.peek_byte() == Some(quote) && self.byte_at(1) == Some(quote) {
                    self.pos += 2;
                    break;
                }
                push_char(quote_char, &mut text, &mut data);
                continue;
            }
            if !triple && (ch == '\n' || ch == '\r') {
                return Err(LexError::new("unterminated string literal", start));
            }
            self.pos += ch.len_utf8();

            if ch == '\\' {
                let Some(esc) = self.peek_char() else {
                    return Err(LexError::new("unterminated string literal", start));
                };
                self.pos += esc.len_utf8();
                if raw {
                    // Raw mode keeps the backslash; it still guards a quote
                    // from terminating the literal.
                    if bytes_mode && !esc.is_ascii() {
                        return Err(LexError::new(
                            "bytes literal may only contain ASCII characters",
                            self.pos,
                        ));
                    }
                    push_char('\\', &mut text, &mut data);
                    push_char(esc, &mut text, &mut data);
                    continue;
                }
                self.lex_escape(esc, bytes_mode, &mut text, &mut data)?;
                continue;
            }

            if bytes_mode && !ch.is_ascii() {
                return Err(LexError::new(
                    "bytes literal may only contain ASCII characters",
                    self.pos,
                ));
            }
            push_char(ch, &mut text, &mut data);
        }

        if bytes_mode {
            Ok(Token::Bytes(data))
        } else {
            Ok(Token::Str(text))
        }
    }

    fn lex_escape(
        &mut self,
        esc: char,
        bytes_mode: bool,
        text: &mut String,
        data: &mut Vec<u8>,
    ) -> Result<(), LexError> {
        let mut push_char = |ch: char, text: &mut String, data: &mut Vec<u8>| {
            if bytes_mode {
                data.push(ch as u8);
            } else {
                text.push(ch);
            }
        };
        match esc {
            '\\' => push_char('\\', text, data),
            '\'' => push_char('\'', text, data),
            '"' => push_char('"', text, data),
            'a' => push_char('\u{07}', text, data),
            'b' => push_char('\u{08}', text, data),
            'f' => push_char('\u{0c}', text, data),
            'n' => push_char('\n', text, data),
            'r' => push_char('\r', text, data),
            't' => push_char('\t', text, data),
            'v' => push_char('\u{0b}', text, data),
            '0'..='7' => {
                let mut value = esc as u32 - '0' as u32;
                for _ in 0..2 {
                    match self.peek_byte() {
                        Some(b @ b'0'..=b'7') => {
                            value = value * 8 + (b - b'0') as u32;
                            self.pos += 1;
                        }
                        _ => break,
                    }
                }
                if bytes_mode {
                    if value > 0xff {
                        return Err(LexError::new("invalid octal escape", self.pos));
                    }
                    data.push(value as u8);
                } else {
                    match char::from_u32(value) {
                        Some(ch) => text.push(ch),
                        _ => return Err(LexError::new("invalid octal escape", self.pos)),
                    }
                }
            }
            'x' => {
                let value = self.take_hex(2)?;
                if bytes_mode {
                    data.push(value as u8);
                } else {
                    match char::from_u32(value) {
                        Some(ch) => text.push(ch),
                        _ => return Err(LexError::new("invalid \\x escape", self.pos)),
                    }
                }
            }
            'u' if !bytes_mode => {
                let value = self.take_hex(4)?;
                match char::from_u32(value) {
                    Some(ch) => text.push(ch),
                    _ => {
                        return Err(LexError::new(
                            "escape produces an invalid character",
                            self.pos,
                        ));
                    }
                }
            }
            'U' if !bytes_mode => {
                let value = self.take_hex(8)?;
                match char::from_u32(value) {
                    Some(ch) => text.push(ch),
                    _ => {
                        return Err(LexError::new(
                            "escape produces an invalid character",
                            self.pos,
                        ));
                    }
                }
            }
            'N' if !bytes_mode => {
                return Err(LexError::new(
                    "named unicode escapes are not supported",
                    self.pos,
                ));
            }
            // Unknown escapes keep the backslash, as the source notation does.
            other => {
                if bytes_mode && !other.is_ascii() {
                    return Err(LexError::new(
                        "bytes literal may only contain ASCII characters",
                        self.pos,
                    ));
                }
                push_char('\\', text, data);
                push_char(other, text, data);
            }
        }
        Ok(())
    }

    fn take_hex(&mut self, count: usize) -> Result<u32, LexError> {
        let mut value = 0u32;
        for _ in 0..count {
            let Some(b) = self.peek_byte() else {
                return Err(LexError::new("truncated hex escape", self.pos));
            };
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| LexError::new("invalid hex escape", self.pos))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{LexError, Lexer, Token};

    fn lex_all(input: &str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn lex_one(input: &str) -> Token {
        let mut tokens = lex_all(input).expect("lex");
        assert_eq!(tokens.pop(), Some(Token::Eof));
        assert_eq!(tokens.len(), 1, "expected one token from {input:?}");
        tokens.pop().expect("token")
    }

    #[test]
    fn punctuation_and_keywords() {
        let tokens = lex_all("{ } [ ] ( ) : , + - True False None").expect("lex");
        assert_eq!(
            tokens,
            vec![
                Token::LeftBrace,
                Token::RightBrace,
                Token::LeftBracket,
                Token::RightBracket,
                Token::LeftParen,
                Token::RightParen,
                Token::Colon,
                Token::Comma,
                Token::Plus,
                Token::Minus,
                Token::True,
                Token::False,
                Token::None,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn integers_in_all_radixes() {
        assert_eq!(lex_one("42"), Token::Int(42));
        assert_eq!(lex_one("0"), Token::Int(0));
        assert_eq!(lex_one("00"), Token::Int(0));
        assert_eq!(lex_one("0xff"), Token::Int(255));
        assert_eq!(lex_one("0o17"), Token::Int(15));
        assert_eq!(lex_one("0b101"), Token::Int(5));
        assert_eq!(lex_one("1_000_000"), Token::Int(1_000_000));
        assert_eq!(lex_one("0x_ff"), Token::Int(255));
    }

    #[test]
    fn floats_in_all_shapes() {
        assert_eq!(lex_one("1.5"), Token::Float(1.5));
        assert_eq!(lex_one(".5"), Token::Float(0.5));
        assert_eq!(lex_one("5."), Token::Float(5.0));
        assert_eq!(lex_one("1e3"), Token::Float(1000.0));
        assert_eq!(lex_one("1.5e-2"), Token::Float(0.015));
        assert_eq!(lex_one("1_0.2_5"), Token::Float(10.25));
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(lex_all("007").is_err());
        assert!(lex_all("1__0").is_err());
        assert!(lex_all("1_").is_err());
        assert!(lex_all("0x").is_err());
        assert!(lex_all("1e").is_err());
        assert!(lex_all("2j").is_err());
        assert!(lex_all("170141183460469231731687303715884105728").is_err());
    }

    #[test]
    fn strings_with_escapes() {
        assert_eq!(lex_one(r"'a\nb'"), Token::Str("a\nb".to_string()));
        assert_eq!(lex_one(r"'\x41'"), Token::Str("A".to_string()));
        assert_eq!(lex_one(r"'A'"), Token::Str("A".to_string()));
        assert_eq!(lex_one(r"'\101'"), Token::Str("A".to_string()));
        assert_eq!(lex_one(r#""it's""#), Token::Str("it's".to_string()));
        // Unknown escapes keep the backslash.
        assert_eq!(lex_one(r"'\q'"), Token::Str("\\q".to_string()));
    }

    #[test]
    fn raw_and_prefixed_strings() {
        assert_eq!(lex_one(r"r'a\nb'"), Token::Str("a\\nb".to_string()));
        assert_eq!(lex_one(r"R'\''"), Token::Str("\\'".to_string()));
        assert_eq!(lex_one("u'x'"), Token::Str("x".to_string()));
        assert_eq!(lex_one("b'ab\\x00'"), Token::Bytes(vec![b'a', b'b', 0]));
        assert_eq!(lex_one(r"rb'\n'"), Token::Bytes(vec![b'\\', b'n']));
        assert_eq!(lex_one(r"BR'\n'"), Token::Bytes(vec![b'\\', b'n']));
    }

    #[test]
    fn triple_quoted_strings() {
        assert_eq!(lex_one("'''a'b'''"), Token::Str("a'b".to_string()));
        assert_eq!(lex_one(r#""""x""""#), Token::Str("x".to_string()));
    }

    #[test]
    fn bad_strings_are_errors() {
        assert!(lex_all("'abc").is_err());
        assert!(lex_all("f'x'").is_err());
        assert!(lex_all("z'x'").is_err());
        assert!(lex_all(r"'\xf'").is_err());
        assert!(lex_all(r"'\N{DEGREE SIGN}'").is_err());
        assert!(lex_all(r"'\ud800'").is_err());
        assert!(lex_all("b'é'").is_err());
    }

    #[test]
    fn unexpected_characters_are_errors() {
        assert!(lex_all("{a: 1}").is_err());
        assert!(lex_all("@").is_err());
        assert!(lex_all("…").is_err());
    }
}
