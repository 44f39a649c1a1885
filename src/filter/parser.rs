//! Precedence-climbing parser for the filter DSL
//!
//! # Grammar
//!
//! ```text
//! filter := outer EOF
//! outer  := inner (("and" | "or") inner)*    precedence climbing, left-assoc
//! inner  := '(' outer ')'
//!         | FIELD comp_op value
//! value  := STRING | INT | FLOAT | BOOL | NULL
//! ```
//!
//! `and` (precedence 2) binds tighter than `or` (precedence 1), so
//! `a = 1 and b = 2 or c = 3` parses as `(a = 1 and b = 2) or c = 3`.
//! Literal conversion happens here: a numeric lexeme that does not fit the
//! target type is a [`ParseError`], never a panic.

use crate::error::{ExpectedTags, ParseError};
use crate::filter::scanner::{Scanner, Tag, Token};
use crate::filter::value::Value;
use crate::filter::{BoolFilter, BoolOp, CompFilter, CompOp, Filter};

const COMP_OP_TAGS: &[Tag] = &[
    Tag::Eq,
    Tag::Neq,
    Tag::Lt,
    Tag::Le,
    Tag::Ge,
    Tag::Gt,
    Tag::Like,
    Tag::Fuzzy,
];

/// Parse a filter expression
///
/// The empty string means "no filter" and parses to `None`; anything else
/// must be a complete expression with no trailing input.
pub fn parse(input: &str) -> Result<Option<Filter>, ParseError> {
    if input.is_empty() {
        return Ok(None);
    }
    let mut parser = Parser::new(Scanner::new(input));
    let filter = parser.parse_outer(1)?;
    parser.require_next(&[Tag::Eof])?;
    Ok(Some(filter))
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

    fn parse_outer(&mut self, min_prec: u8) -> Result<Filter, ParseError> {
        let mut filter = self.parse_inner()?;
        loop {
            let Some(op) = bool_op(self.peek_tag()?) else {
                break;
            };
            if op.precedence() < min_prec {
                break;
            }
            self.get_next()?;
            let rhs = self.parse_outer(op.precedence() + 1)?;
            filter = Filter::Bool(BoolFilter::new(filter, op, rhs));
        }
        Ok(filter)
    }

    fn parse_inner(&mut self) -> Result<Filter, ParseError> {
        let token = self.get_next()?;
        match token.tag {
            Tag::LParen => {
                let filter = self.parse_outer(0)?;
                self.require_next(&[Tag::RParen])?;
                Ok(filter)
            }
            Tag::Field => {
                let op_token = self.require_next(COMP_OP_TAGS)?;
                let value = self.parse_value()?;
                let op = match op_token.tag {
                    Tag::Eq => CompOp::Eq,
                    Tag::Neq => CompOp::Neq,
                    Tag::Lt => CompOp::Lt,
                    Tag::Le => CompOp::Le,
                    Tag::Gt => CompOp::Gt,
                    Tag::Ge => CompOp::Ge,
                    Tag::Like => CompOp::Like,
                    Tag::Fuzzy => CompOp::FuzzyLike,
                    // require_next restricted the tag to the comparison set
                    _ => unreachable!("non-comparison token {}", op_token),
                };
                Ok(Filter::Comp(CompFilter::new(token.lexeme, op, value)))
            }
            _ => Err(ParseError::UnexpectedToken {
                token: token.to_string(),
            }),
        }
    }

    fn parse_value(&mut self) -> Result<Value, ParseError> {
        let token = self.get_next()?;
        match token.tag {
            Tag::Null => Ok(Value::Null),
            Tag::Int => match token.lexeme.parse::<i64>() {
                Ok(v) => Ok(Value::Int(v)),
                Err(_) => Err(ParseError::InvalidLiteral {
                    kind: "int",
                    lexeme: token.lexeme,
                }),
            },
            Tag::Float => match token.lexeme.parse::<f64>() {
                Ok(v) => Ok(Value::Float(v)),
                Err(_) => Err(ParseError::InvalidLiteral {
                    kind: "float",
                    lexeme: token.lexeme,
                }),
            },
            Tag::Bool => Ok(Value::Bool(token.lexeme == "true")),
            Tag::String => Ok(Value::String(token.lexeme)),
            _ => Err(ParseError::UnexpectedValue {
                token: token.to_string(),
            }),
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

fn bool_op(tag: Tag) -> Option<BoolOp> {
    match tag {
        Tag::And => Some(BoolOp::And),
        Tag::Or => Some(BoolOp::Or),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(input: &str) -> Filter {
        parse(input).unwrap().unwrap()
    }

    #[test]
    fn test_parse_empty_input_is_no_filter() {
        assert_eq!(parse("").unwrap(), None);
    }

    #[test]
    fn test_parse_whitespace_only_is_an_error() {
        let err = parse("   ").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                token: "{EOF: ''}".to_string()
            }
        );
    }

    #[test]
    fn test_parse_string_comparison() {
        assert_eq!(parse_one(r#"foo = "bar""#), Filter::eq("foo", "bar"));
    }

    #[test]
    fn test_parse_literal_kinds() {
        assert_eq!(parse_one("foo = 1"), Filter::eq("foo", 1));
        assert_eq!(parse_one("foo = -1"), Filter::eq("foo", -1));
        assert_eq!(parse_one("foo = 1.5"), Filter::eq("foo", 1.5));
        assert_eq!(parse_one("foo = -2.75"), Filter::eq("foo", -2.75));
        assert_eq!(parse_one("foo = true"), Filter::eq("foo", true));
        assert_eq!(parse_one("foo = false"), Filter::eq("foo", false));
        assert_eq!(parse_one("foo = null"), Filter::eq("foo", Value::Null));
    }

    #[test]
    fn test_parse_all_comparison_ops() {
        assert_eq!(parse_one("a != 1"), Filter::neq("a", 1));
        assert_eq!(parse_one("a < 1"), Filter::lt("a", 1));
        assert_eq!(parse_one("a <= 1"), Filter::le("a", 1));
        assert_eq!(parse_one("a > 1"), Filter::gt("a", 1));
        assert_eq!(parse_one("a >= 1"), Filter::ge("a", 1));
        assert_eq!(parse_one(r#"a ~= "b""#), Filter::like("a", "b"));
        assert_eq!(parse_one(r#"a ~ "b""#), Filter::fuzzy_like("a", "b"));
    }

    #[test]
    fn test_parse_and() {
        assert_eq!(
            parse_one(r#"foo = "bar" and bar > 1"#),
            Filter::and(Filter::eq("foo", "bar"), Filter::gt("bar", 1)),
        );
    }

    #[test]
    fn test_parse_and_binds_tighter_than_or() {
        assert_eq!(
            parse_one("a = 1 and b = 2 or c = 3"),
            Filter::or(
                Filter::and(Filter::eq("a", 1), Filter::eq("b", 2)),
                Filter::eq("c", 3),
            ),
        );
        assert_eq!(
            parse_one("a = 1 or b = 2 and c = 3"),
            Filter::or(
                Filter::eq("a", 1),
                Filter::and(Filter::eq("b", 2), Filter::eq("c", 3)),
            ),
        );
    }

    #[test]
    fn test_parse_and_is_left_associative() {
        assert_eq!(
            parse_one("a = 1 and b = 2 and c = 3"),
            Filter::and(
                Filter::and(Filter::eq("a", 1), Filter::eq("b", 2)),
                Filter::eq("c", 3),
            ),
        );
    }

    #[test]
    fn test_parse_parens_override_precedence() {
        assert_eq!(
            parse_one("a = 1 and (b = 2 or c = 3)"),
            Filter::and(
                Filter::eq("a", 1),
                Filter::or(Filter::eq("b", 2), Filter::eq("c", 3)),
            ),
        );
    }

    #[test]
    fn test_parse_redundant_parens() {
        assert_eq!(parse_one("((a = 1))"), Filter::eq("a", 1));
    }

    #[test]
    fn test_parse_missing_operator() {
        let err = parse("foo 1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected one of '[= != < <= >= > ~= ~]', found 'INT'"
        );
    }

    #[test]
    fn test_parse_missing_value() {
        let err = parse("foo =").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedValue {
                token: "{EOF: ''}".to_string()
            }
        );
    }

    #[test]
    fn test_parse_trailing_input() {
        let err = parse("a = 1 b = 2").unwrap_err();
        assert_eq!(err.to_string(), "expected one of '[EOF]', found 'FIELD'");
    }

    #[test]
    fn test_parse_unclosed_group() {
        let err = parse("(a = 1").unwrap_err();
        assert_eq!(err.to_string(), "expected one of '[)]', found 'EOF'");
    }

    #[test]
    fn test_parse_keyword_is_not_a_field() {
        let err = parse("and = 1").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                token: "{AND: 'and'}".to_string()
            }
        );
    }

    #[test]
    fn test_parse_unterminated_string_stays_a_scan_error() {
        let err = parse(r#"foo = "bar"#).unwrap_err();
        assert!(err.is_scan());
    }

    #[test]
    fn test_parse_int_overflow_is_an_error() {
        let err = parse("foo = 99999999999999999999").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidLiteral {
                kind: "int",
                lexeme: "99999999999999999999".to_string()
            }
        );
    }
}
