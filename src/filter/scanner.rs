//! Tokenizer for the filter DSL
//!
//! Splits input like `actor = "steve" and series > 2` into tokens. Keywords
//! (`and`, `or`, `true`, `false`, `null`) are lexed as fields first and
//! reclassified, multi-character operators are resolved with one character
//! of lookahead, and strings are double-quoted with no escape sequences.
//!
//! All positions are byte offsets into the input.

use std::fmt;

use crate::error::{ScanError, ScanErrorKind};

/// Token kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Eof,
    LParen,
    RParen,
    And,
    Or,
    Eq,
    Neq,
    Like,
    Fuzzy,
    Gt,
    Ge,
    Le,
    Lt,
    Field,
    Int,
    Float,
    Bool,
    String,
    Null,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Eof => "EOF",
            Tag::LParen => "(",
            Tag::RParen => ")",
            Tag::And => "AND",
            Tag::Or => "OR",
            Tag::Eq => "=",
            Tag::Neq => "!=",
            Tag::Like => "~=",
            Tag::Fuzzy => "~",
            Tag::Gt => ">",
            Tag::Ge => ">=",
            Tag::Le => "<=",
            Tag::Lt => "<",
            Tag::Field => "FIELD",
            Tag::Int => "INT",
            Tag::Float => "FLOAT",
            Tag::Bool => "BOOL",
            Tag::String => "STRING",
            Tag::Null => "NULL",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned token; string lexemes have their quotes stripped
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub tag: Tag,
    pub lexeme: String,
}

impl Token {
    pub fn new(tag: Tag, lexeme: impl Into<String>) -> Self {
        Self {
            tag,
            lexeme: lexeme.into(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}: '{}'}}", self.tag, self.lexeme)
    }
}

/// Lazy tokenizer; [`Scanner::next_token`] yields one token at a time and
/// keeps yielding [`Tag::Eof`] once the input is exhausted
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    offset: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            offset: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token, ScanError> {
        self.skip_whitespace();

        let Some(c) = self.bump() else {
            return Ok(self.emit(Tag::Eof));
        };

        match c {
            '(' => Ok(self.emit(Tag::LParen)),
            ')' => Ok(self.emit(Tag::RParen)),
            '=' => Ok(self.emit(Tag::Eq)),
            '!' => {
                if self.match_next_char('=') {
                    Ok(self.emit(Tag::Neq))
                } else {
                    Err(self.error(ScanErrorKind::IncompleteNeq))
                }
            }
            '~' => {
                if self.match_next_char('=') {
                    Ok(self.emit(Tag::Like))
                } else {
                    Ok(self.emit(Tag::Fuzzy))
                }
            }
            '>' => {
                if self.match_next_char('=') {
                    Ok(self.emit(Tag::Ge))
                } else {
                    Ok(self.emit(Tag::Gt))
                }
            }
            '<' => {
                if self.match_next_char('=') {
                    Ok(self.emit(Tag::Le))
                } else {
                    Ok(self.emit(Tag::Lt))
                }
            }
            '"' => self.scan_string(),
            c if is_field_char(c) => Ok(self.scan_field()),
            c if is_number_start(c) => Ok(self.scan_number()),
            _ => Err(self.error(ScanErrorKind::UnknownEntity)),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    // Consumes the next character only if it matches, for multi-character
    // operators like >= and !=
    fn match_next_char(&mut self, want: char) -> bool {
        if self.peek_char() == Some(want) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, char::is_whitespace) {
            self.bump();
        }
        self.offset = self.pos;
    }

    fn scan_field(&mut self) -> Token {
        while self
            .peek_char()
            .map_or(false, |c| is_field_char(c) || c.is_ascii_digit())
        {
            self.bump();
        }
        let mut token = self.emit(Tag::Field);
        if let Some(tag) = keyword(&token.lexeme) {
            token.tag = tag;
        }
        token
    }

    fn scan_number(&mut self) -> Token {
        let mut has_decimal = false;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() || (c == '.' && !has_decimal) {
                has_decimal = has_decimal || c == '.';
                self.bump();
            } else {
                break;
            }
        }
        self.emit(if has_decimal { Tag::Float } else { Tag::Int })
    }

    fn scan_string(&mut self) -> Result<Token, ScanError> {
        while !self.match_next_char('"') {
            if self.bump().is_none() {
                return Err(self.error(ScanErrorKind::UnclosedQuote));
            }
        }
        let mut token = self.emit(Tag::String);
        token.lexeme = token.lexeme.trim_matches('"').to_string();
        Ok(token)
    }

    fn emit(&mut self, tag: Tag) -> Token {
        let lexeme = self.input[self.offset..self.pos].to_string();
        self.offset = self.pos;
        Token { tag, lexeme }
    }

    fn error(&self, kind: ScanErrorKind) -> ScanError {
        ScanError {
            offset: self.pos,
            consumed: self.input[self.offset..self.pos].to_string(),
            kind,
        }
    }
}

/// Scan the whole input eagerly
pub fn scan(input: &str) -> Result<Vec<Token>, ScanError> {
    let mut scanner = Scanner::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = scanner.next_token()?;
        let done = token.tag == Tag::Eof;
        tokens.push(token);
        if done {
            break;
        }
    }
    Ok(tokens)
}

fn keyword(lexeme: &str) -> Option<Tag> {
    match lexeme {
        "and" => Some(Tag::And),
        "or" => Some(Tag::Or),
        "true" | "false" => Some(Tag::Bool),
        "null" => Some(Tag::Null),
        _ => None,
    }
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_number_start(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}
