//! @acp:module "Settings Literal Parser"
//! @acp:summary "Restricted recursive-descent parser for JavaScript object literals"
//! @acp:domain schema
//! @acp:layer parser
//!
//! Accepts objects, arrays, quoted strings, numbers, `true`, `false` and
//! `null`. Object keys may be bare identifiers, strings or numbers. Comments
//! and trailing commas are tolerated. Everything else (function expressions,
//! calls, bare identifiers as values, template strings) is rejected, so the
//! settings literal is never executed.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Nesting limit for arrays and objects
const MAX_DEPTH: usize = 64;

/// What went wrong while reading a literal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralErrorKind {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("'{0}' is not a literal value")]
    NotALiteral(String),
    #[error("nesting deeper than {MAX_DEPTH} levels")]
    TooDeep,
    #[error("unexpected input after literal")]
    TrailingInput,
}

/// @acp:summary "Positioned literal parse failure"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at offset {offset}")]
pub struct LiteralError {
    /// Byte offset into the parsed text
    pub offset: usize,
    pub kind: LiteralErrorKind,
}

type LiteralResult<T> = std::result::Result<T, LiteralError>;

/// @acp:summary "Parse a complete literal; only whitespace and comments may follow"
pub fn parse_literal(text: &str) -> LiteralResult<Value> {
    let mut parser = LiteralParser::new(text);
    let value = parser.value()?;
    parser.skip_trivia()?;
    if parser.pos < text.len() {
        return Err(parser.error(LiteralErrorKind::TrailingInput));
    }
    Ok(value)
}

/// @acp:summary "Parse one literal at the start of `text`, returning it and the bytes consumed"
pub fn parse_literal_prefix(text: &str) -> LiteralResult<(Value, usize)> {
    let mut parser = LiteralParser::new(text);
    let value = parser.value()?;
    Ok((value, parser.pos))
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0, depth: 0 }
    }

    fn error(&self, kind: LiteralErrorKind) -> LiteralError {
        LiteralError {
            offset: self.pos,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> LiteralResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.error(LiteralErrorKind::UnexpectedChar(c))),
            None => Err(self.error(LiteralErrorKind::UnexpectedEnd)),
        }
    }

    /// Skip whitespace, `// line` and `/* block */` comments
    fn skip_trivia(&mut self) -> LiteralResult<()> {
        loop {
            let rest = &self.src[self.pos..];
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("//") {
                let end = trimmed.find('\n').unwrap_or(trimmed.len());
                self.pos += end;
            } else if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => {
                        self.pos = self.src.len();
                        return Err(self.error(LiteralErrorKind::UnexpectedEnd));
                    }
                }
            } else {
                return Ok(());
            }
        }
    }

    fn value(&mut self) -> LiteralResult<Value> {
        self.skip_trivia()?;
        match self.peek() {
            None => Err(self.error(LiteralErrorKind::UnexpectedEnd)),
            Some('{') => self.nested(Self::object),
            Some('[') => self.nested(Self::array),
            Some('\'') | Some('"') => Ok(Value::String(self.string()?)),
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_start(c) => {
                let start = self.pos;
                let ident = self.identifier();
                match ident {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    "null" => Ok(Value::Null),
                    other => Err(LiteralError {
                        offset: start,
                        kind: LiteralErrorKind::NotALiteral(other.to_string()),
                    }),
                }
            }
            Some(c) => Err(self.error(LiteralErrorKind::UnexpectedChar(c))),
        }
    }

    fn nested(&mut self, f: fn(&mut Self) -> LiteralResult<Value>) -> LiteralResult<Value> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(LiteralErrorKind::TooDeep));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn object(&mut self) -> LiteralResult<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Object(map));
            }

            let key = self.key()?;
            self.skip_trivia()?;
            self.expect(':')?;
            let value = self.value()?;
            map.insert(key, value);

            self.skip_trivia()?;
            match self.bump() {
                Some(',') => continue,
                Some('}') => return Ok(Value::Object(map)),
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(LiteralErrorKind::UnexpectedChar(c)));
                }
                None => return Err(self.error(LiteralErrorKind::UnexpectedEnd)),
            }
        }
    }

    fn key(&mut self) -> LiteralResult<String> {
        match self.peek() {
            Some('\'') | Some('"') => self.string(),
            Some(c) if is_ident_start(c) => Ok(self.identifier().to_string()),
            Some(c) if c.is_ascii_digit() => match self.number()? {
                Value::Number(n) => Ok(n.to_string()),
                _ => Err(self.error(LiteralErrorKind::UnexpectedChar(c))),
            },
            Some(c) => Err(self.error(LiteralErrorKind::UnexpectedChar(c))),
            None => Err(self.error(LiteralErrorKind::UnexpectedEnd)),
        }
    }

    fn array(&mut self) -> LiteralResult<Value> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(Value::Array(items));
            }

            items.push(self.value()?);

            self.skip_trivia()?;
            match self.bump() {
                Some(',') => continue,
                Some(']') => return Ok(Value::Array(items)),
                Some(c) => {
                    self.pos -= c.len_utf8();
                    return Err(self.error(LiteralErrorKind::UnexpectedChar(c)));
                }
                None => return Err(self.error(LiteralErrorKind::UnexpectedEnd)),
            }
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '_' || c == '$' || c.is_alphanumeric() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn string(&mut self) -> LiteralResult<String> {
        let quote = match self.bump() {
            Some(q) => q,
            None => return Err(self.error(LiteralErrorKind::UnexpectedEnd)),
        };
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error(LiteralErrorKind::UnterminatedString)),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out)?,
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String) -> LiteralResult<()> {
        match self.bump() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            // line continuation
            Some('\n') => {}
            Some('u') => {
                let digits = self.src.get(self.pos..self.pos + 4);
                let code = digits
                    .and_then(|d| u32::from_str_radix(d, 16).ok())
                    .and_then(char::from_u32)
                    .ok_or_else(|| self.error(LiteralErrorKind::InvalidEscape))?;
                self.pos += 4;
                out.push(code);
            }
            Some(c @ ('\'' | '"' | '\\' | '/')) => out.push(c),
            Some(_) => return Err(self.error(LiteralErrorKind::InvalidEscape)),
            None => return Err(self.error(LiteralErrorKind::UnterminatedString)),
        }
        Ok(())
    }

    fn number(&mut self) -> LiteralResult<Value> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '+') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.src[start..self.pos];
        let invalid = || LiteralError {
            offset: start,
            kind: LiteralErrorKind::InvalidNumber(text.to_string()),
        };

        if !text
            .trim_start_matches(['-', '+'])
            .starts_with(|c: char| c.is_ascii_digit() || c == '.')
        {
            return Err(invalid());
        }

        let unsigned = text.strip_prefix('+').unwrap_or(text);
        if let Ok(i) = unsigned.parse::<i64>() {
            return Ok(Value::Number(Number::from(i)));
        }
        unsigned
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(invalid)
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}
