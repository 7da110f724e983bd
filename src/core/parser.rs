//! Purpose: Parse literal expressions into `Value` via recursive descent.
//! Exports: `parse_literal`, `ParseError`, `MAX_DEPTH`.
//! Role: Safe literal evaluator; the only parse entry point used by scanning.
//! Invariants: Only constructs values; nothing resembling evaluation happens here.
//! Invariants: Recursion is bounded by `MAX_DEPTH`; exceeding it is a parse error.

use std::fmt;

use super::lexer::{LexError, Lexer, Token};
use super::value::{Value, py_eq};

pub const MAX_DEPTH: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub offset: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            message: err.message,
            offset: err.offset,
        }
    }
}

/// Parse a complete literal expression. Trailing tokens are an error, so the
/// caller can rely on the whole input having been consumed.
pub fn parse_literal(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(input)?;
    let value = parser.parse_expr(0)?;
    parser.expect_eof()?;
    Ok(value)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Self { lexer, current })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn offset(&self) -> usize {
        self.lexer.position()
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        if self.current == Token::Eof {
            Ok(())
        } else {
            Err(ParseError::new(
                "trailing input after literal",
                self.offset(),
            ))
        }
    }

    fn parse_expr(&mut self, depth: usize) -> Result<Value, ParseError> {
        if depth > MAX_DEPTH {
            return Err(ParseError::new("literal nesting too deep", self.offset()));
        }
        match self.current.clone() {
            Token::None => {
                self.advance()?;
                Ok(Value::None)
            }
            Token::True => {
                self.advance()?;
                Ok(Value::Bool(true))
            }
            Token::False => {
                self.advance()?;
                Ok(Value::Bool(false))
            }
            Token::Int(int) => {
                self.advance()?;
                Ok(Value::Int(int))
            }
            Token::Float(float) => {
                self.advance()?;
                Ok(Value::Float(float))
            }
            Token::Str(text) => {
                self.advance()?;
                self.concat_str(text)
            }
            Token::Bytes(data) => {
                self.advance()?;
                self.concat_bytes(data)
            }
            Token::Plus | Token::Minus => self.parse_signed(),
            Token::LeftBracket => {
                self.advance()?;
                let items = self.parse_items(Token::RightBracket, depth)?;
                Ok(Value::List(items))
            }
            Token::LeftParen => self.parse_paren(depth),
            Token::LeftBrace => self.parse_brace(depth),
            Token::Eof => Err(ParseError::new("unexpected end of input", self.offset())),
            other => Err(ParseError::new(
                format!("unexpected token {other:?}"),
                self.offset(),
            )),
        }
    }

    // Adjacent string literals concatenate; text and bytes never mix.
    fn concat_str(&mut self, mut text: String) -> Result<Value, ParseError> {
        loop {
            match self.current.clone() {
                Token::Str(next) => {
                    text.push_str(&next);
                    self.advance()?;
                }
                Token::Bytes(_) => {
                    return Err(ParseError::new(
                        "cannot mix string and bytes literals",
                        self.offset(),
                    ));
                }
                _ => return Ok(Value::Str(text)),
            }
        }
    }

    fn concat_bytes(&mut self, mut data: Vec<u8>) -> Result<Value, ParseError> {
        loop {
            match self.current.clone() {
                Token::Bytes(next) => {
                    data.extend_from_slice(&next);
                    self.advance()?;
                }
                Token::Str(_) => {
                    return Err(ParseError::new(
                        "cannot mix string and bytes literals",
                        self.offset(),
                    ));
                }
                _ => return Ok(Value::Bytes(data)),
            }
        }
    }

    // A sign applies to a directly following numeric token; bools count as
    // numbers and collapse to ints, as the source notation has it.
    fn parse_signed(&mut self) -> Result<Value, ParseError> {
        let negative = self.current == Token::Minus;
        self.advance()?;
        let value = match self.current.clone() {
            Token::Int(int) => {
                if negative {
                    Value::Int(int.checked_neg().ok_or_else(|| {
                        ParseError::new("integer literal out of supported range", self.offset())
                    })?)
                } else {
                    Value::Int(int)
                }
            }
            Token::Float(float) => Value::Float(if negative { -float } else { float }),
            Token::True => Value::Int(if negative { -1 } else { 1 }),
            Token::False => Value::Int(0),
            _ => {
                return Err(ParseError::new(
                    "unary sign requires a numeric literal",
                    self.offset(),
                ));
            }
        };
        self.advance()?;
        Ok(value)
    }

    fn parse_paren(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.advance()?;
        if self.current == Token::RightParen {
            self.advance()?;
            return Ok(Value::Tuple(Vec::new()));
        }
        let first = self.parse_expr(depth + 1)?;
        if self.current != Token::Comma {
            // Parenthesized expression, not a tuple.
            self.expect(Token::RightParen)?;
            return Ok(first);
        }
        self.advance()?;
        let mut items = vec![first];
        items.extend(self.parse_items(Token::RightParen, depth)?);
        Ok(Value::Tuple(items))
    }

    fn parse_brace(&mut self, depth: usize) -> Result<Value, ParseError> {
        self.advance()?;
        if self.current == Token::RightBrace {
            self.advance()?;
            return Ok(Value::Dict(Vec::new()));
        }
        let first = self.parse_expr(depth + 1)?;
        if self.current == Token::Colon {
            self.advance()?;
            let value = self.parse_expr(depth + 1)?;
            return self.parse_dict_rest(first, value, depth);
        }
        self.parse_set_rest(first, depth)
    }

    fn parse_dict_rest(
        &mut self,
        first_key: Value,
        first_value: Value,
        depth: usize,
    ) -> Result<Value, ParseError> {
        self.require_hashable(&first_key)?;
        let mut entries = vec![(first_key, first_value)];
        loop {
            if self.current == Token::RightBrace {
                self.advance()?;
                return Ok(Value::Dict(entries));
            }
            self.expect(Token::Comma)?;
            if self.current == Token::RightBrace {
                self.advance()?;
                return Ok(Value::Dict(entries));
            }
            let key = self.parse_expr(depth + 1)?;
            self.require_hashable(&key)?;
            self.expect(Token::Colon)?;
            let value = self.parse_expr(depth + 1)?;
            // Duplicate keys collapse: first key object stays, last value wins.
            match entries.iter_mut().find(|(existing, _)| py_eq(existing, &key)) {
                Some((_, slot)) => *slot = value,
                _ => entries.push((key, value)),
            }
        }
    }

    fn parse_set_rest(&mut self, first: Value, depth: usize) -> Result<Value, ParseError> {
        self.require_hashable(&first)?;
        let mut elems = vec![first];
        loop {
            if self.current == Token::RightBrace {
                self.advance()?;
                return Ok(Value::Set(elems));
            }
            self.expect(Token::Comma)?;
            if self.current == Token::RightBrace {
                self.advance()?;
                return Ok(Value::Set(elems));
            }
            let elem = self.parse_expr(depth + 1)?;
            self.require_hashable(&elem)?;
            if !elems.iter().any(|existing| py_eq(existing, &elem)) {
                elems.push(elem);
            }
        }
    }

    fn parse_items(&mut self, terminator: Token, depth: usize) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            if self.current == terminator {
                self.advance()?;
                return Ok(items);
            }
            items.push(self.parse_expr(depth + 1)?);
            if self.current == Token::Comma {
                self.advance()?;
                continue;
            }
            if self.current == terminator {
                self.advance()?;
                return Ok(items);
            }
            return Err(ParseError::new(
                format!("expected ',' or {terminator:?}"),
                self.offset(),
            ));
        }
    }

    fn expect(&mut self, token: Token) -> Result<(), ParseError> {
        if self.current == token {
            self.advance()?;
            Ok(())
        } else {
            Err(ParseError::new(
                format!("expected {token:?}, found {:?}", self.current),
                self.offset(),
            ))
        }
    }

    fn require_hashable(&self, value: &Value) -> Result<(), ParseError> {
        if value.is_hashable() {
            Ok(())
        } else {
            Err(ParseError::new(
                format!("unhashable {} in key position", value.type_name()),
                self.offset(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_literal, MAX_DEPTH};
    use crate::core::value::Value;

    #[test]
    fn parses_scalars() {
        assert_eq!(parse_literal("None").expect("parse"), Value::None);
        assert_eq!(parse_literal("True").expect("parse"), Value::Bool(true));
        assert_eq!(parse_literal("-3").expect("parse"), Value::Int(-3));
        assert_eq!(parse_literal("+2.5").expect("parse"), Value::Float(2.5));
        assert_eq!(parse_literal("-True").expect("parse"), Value::Int(-1));
        assert_eq!(
            parse_literal("'a' 'b'").expect("parse"),
            Value::Str("ab".to_string())
        );
    }

    #[test]
    fn parses_containers() {
        assert_eq!(
            parse_literal("[1, 2]").expect("parse"),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(parse_literal("()").expect("parse"), Value::Tuple(vec![]));
        assert_eq!(
            parse_literal("(1,)").expect("parse"),
            Value::Tuple(vec![Value::Int(1)])
        );
        // A parenthesized scalar is grouping, not a 1-tuple.
        assert_eq!(parse_literal("(1)").expect("parse"), Value::Int(1));
        assert_eq!(parse_literal("{}").expect("parse"), Value::Dict(vec![]));
        assert_eq!(
            parse_literal("{1, 2}").expect("parse"),
            Value::Set(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(
            parse_literal("{'a': 1}").expect("parse"),
            Value::Dict(vec![(Value::Str("a".to_string()), Value::Int(1))])
        );
    }

    #[test]
    fn trailing_commas_are_accepted() {
        assert!(parse_literal("[1, 2,]").is_ok());
        assert!(parse_literal("{'a': 1,}").is_ok());
        assert!(parse_literal("{1, 2,}").is_ok());
        assert!(parse_literal("(1, 2,)").is_ok());
    }

    #[test]
    fn duplicate_dict_keys_collapse_last_value_wins() {
        let parsed = parse_literal("{'a': 1, 'a': 2}").expect("parse");
        assert_eq!(
            parsed,
            Value::Dict(vec![(Value::Str("a".to_string()), Value::Int(2))])
        );

        // Numeric cross-type duplicates keep the first key object.
        let parsed = parse_literal("{1: 'x', 1.0: 'y'}").expect("parse");
        assert_eq!(
            parsed,
            Value::Dict(vec![(Value::Int(1), Value::Str("y".to_string()))])
        );
    }

    #[test]
    fn duplicate_set_elements_collapse_first_wins() {
        let parsed = parse_literal("{1, 1.0, 2}").expect("parse");
        assert_eq!(parsed, Value::Set(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn unhashable_keys_are_rejected() {
        assert!(parse_literal("{[1]: 2}").is_err());
        assert!(parse_literal("{{1}: 2}").is_err());
        assert!(parse_literal("{(1, [2]): 3}").is_err());
        assert!(parse_literal("{[1], 2}").is_err());
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(parse_literal("").is_err());
        assert!(parse_literal("{not valid syntax here}").is_err());
        assert!(parse_literal("{'a': 1} trailing").is_err());
        assert!(parse_literal("{'a': }").is_err());
        assert!(parse_literal("1 + 2").is_err());
        assert!(parse_literal("-'a'").is_err());
        assert!(parse_literal("'a' b'b'").is_err());
    }

    #[test]
    fn nesting_depth_is_bounded() {
        let mut deep = String::new();
        for _ in 0..(MAX_DEPTH + 2) {
            deep.push('[');
        }
        deep.push('1');
        for _ in 0..(MAX_DEPTH + 2) {
            deep.push(']');
        }
        assert!(parse_literal(&deep).is_err());

        let mut ok = String::new();
        for _ in 0..8 {
            ok.push('[');
        }
        ok.push('1');
        for _ in 0..8 {
            ok.push(']');
        }
        assert!(parse_literal(&ok).is_ok());
    }
}
