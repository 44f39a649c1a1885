//! Tokenizer for natural-language search input
//!
//! Much smaller surface than the filter DSL tokenizer: `@` and `~` are
//! field markers, double-quoted runs are exact phrases, and any other run
//! of non-whitespace characters is a word. There are no operators and no
//! keywords.

use std::fmt;

use crate::error::{ScanError, ScanErrorKind};

/// Token kind
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tag {
    Eof,
    /// `@` — actor marker
    Mention,
    /// `~` — publication marker
    Publication,
    QuotedString,
    Word,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Eof => "EOF",
            Tag::Mention => "@",
            Tag::Publication => "~",
            Tag::QuotedString => "QUOTED_STRING",
            Tag::Word => "WORD",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned token; quoted lexemes have their quotes stripped
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

/// Lazy tokenizer over search input; keeps yielding [`Tag::Eof`] once the
/// input is exhausted
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
            '@' => Ok(self.emit(Tag::Mention)),
            '~' => Ok(self.emit(Tag::Publication)),
            '"' => self.scan_quoted(),
            // any other non-whitespace character starts a word
            _ => Ok(self.scan_word()),
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

    fn scan_quoted(&mut self) -> Result<Token, ScanError> {
        while !self.match_next_char('"') {
            if self.bump().is_none() {
                return Err(ScanError {
                    offset: self.pos,
                    consumed: self.input[self.offset..self.pos].to_string(),
                    kind: ScanErrorKind::UnclosedQuote,
                });
            }
        }
        let mut token = self.emit(Tag::QuotedString);
        token.lexeme = token.lexeme.trim_matches('"').to_string();
        Ok(token)
    }

    fn scan_word(&mut self) -> Token {
        while self.peek_char().map_or(false, is_word_char) {
            self.bump();
        }
        self.emit(Tag::Word)
    }

    fn emit(&mut self, tag: Tag) -> Token {
        let lexeme = self.input[self.offset..self.pos].to_string();
        self.offset = self.pos;
        Token { tag, lexeme }
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

fn is_word_char(c: char) -> bool {
    !matches!(c, '@' | '~' | '"') && !c.is_whitespace()
}
