//! Parser for natural-language search input
//!
//! Produces a flat list of [`Term`]s:
//!
//! - `"man alive"` — exact phrase on `content`
//! - `karl regrets` — a run of words becomes one fuzzy `content` term
//! - `@steve` — `actor` equality, lowercased
//! - `~xfm` — `publication` equality, lowercased
//!
//! A marker at the very end of the input (`"karl @"`) is accepted and
//! yields a term with an empty value rather than failing the whole query.

use crate::error::{ExpectedTags, ParseError};
use crate::filter::CompOp;
use crate::terms::scanner::{Scanner, Tag, Token};
use crate::terms::Term;

/// Parse search input into terms; empty input is an empty list
pub fn parse(input: &str) -> Result<Vec<Term>, ParseError> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    let mut parser = Parser::new(Scanner::new(input));
    let terms = parser.parse_outer()?;
    parser.require_next(&[Tag::Eof])?;
    Ok(terms)
}

struct Parser<'a> {
    scanner: Scanner<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    fn new(scanner: Scanner<'a>) -> Self {
        Self {
            scanner,
            peeked: None,
        }
    }

    fn parse_outer(&mut self) -> Result<Vec<Term>, ParseError> {
        let mut terms = Vec::new();
        while let Some(term) = self.parse_inner()? {
            terms.push(term);
        }
        Ok(terms)
    }

    fn parse_inner(&mut self) -> Result<Option<Term>, ParseError> {
        let token = self.get_next()?;
        match token.tag {
            Tag::Eof => Ok(None),
            Tag::QuotedString => Ok(Some(Term::new("content", token.lexeme, CompOp::Eq))),
            Tag::Word => {
                let mut words = vec![token.lexeme];
                while self.peek_tag()? == Tag::Word {
                    words.push(self.get_next()?.lexeme);
                }
                Ok(Some(Term::new(
                    "content",
                    words.join(" "),
                    CompOp::FuzzyLike,
                )))
            }
            Tag::Mention => {
                let name = self.require_next(&[Tag::QuotedString, Tag::Word, Tag::Eof])?;
                Ok(Some(Term::new(
                    "actor",
                    name.lexeme.to_lowercase(),
                    CompOp::Eq,
                )))
            }
            Tag::Publication => {
                let name = self.require_next(&[Tag::QuotedString, Tag::Word, Tag::Eof])?;
                Ok(Some(Term::new(
                    "publication",
                    name.lexeme.to_lowercase(),
                    CompOp::Eq,
                )))
            }
        }
    }

    fn peek_tag(&mut self) -> Result<Tag, ParseError> {
        match &self.peeked {
            Some(token) => Ok(token.tag),
            None => {
                let token = self.scanner.next_token()?;
                let tag = token.tag;
                self.peeked = Some(token);
                Ok(tag)
            }
        }
    }

    fn get_next(&mut self) -> Result<Token, ParseError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => Ok(self.scanner.next_token()?),
        }
    }

    fn require_next(&mut self, one_of: &[Tag]) -> Result<Token, ParseError> {
        let token = self.get_next()?;
        if one_of.contains(&token.tag) {
            return Ok(token);
        }
        Err(ParseError::ExpectedOneOf {
            expected: ExpectedTags(one_of.iter().map(Tag::as_str).collect()),
            found: token.tag.as_str().to_string(),
        })
    }
}
