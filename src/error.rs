//! Error types for scanning, parsing, and query compilation
//!
//! Each pipeline stage has its own error type: [`ScanError`] for the
//! tokenizers, [`ParseError`] for the parsers (a scan failure during parsing
//! stays visible as a scan error underneath), and [`CompileError`] for the
//! query backends. All of them are plain values; the library performs no
//! logging and no I/O on failure paths.

use std::fmt;

use thiserror::Error;

use crate::filter::{CompOp, ValueType};
use crate::schema::FieldKind;

/// Why the scanner rejected the input
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanErrorKind {
    #[error("unclosed double quote")]
    UnclosedQuote,

    #[error("expected '=' after '!'")]
    IncompleteNeq,

    #[error("unrecognized character")]
    UnknownEntity,
}

/// Tokenizer failure with the byte offset and the text consumed since the
/// last token boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to scan input at offset {offset} ('{consumed}'): {kind}")]
pub struct ScanError {
    /// Byte offset of the scanner position when the error was raised
    pub offset: usize,
    /// Input consumed since the last token boundary
    pub consumed: String,
    pub kind: ScanErrorKind,
}

/// Token names acceptable at the point a parse failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedTags(pub Vec<&'static str>);

impl fmt::Display for ExpectedTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, tag) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
        }
        f.write_str("]")
    }
}

/// Parser failure
///
/// Token payloads are carried in their rendered `{TAG: 'lexeme'}` form so the
/// filter parser and the search-terms parser can share one error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("unexpected token {token}")]
    UnexpectedToken { token: String },

    #[error("unexpected value token {token}")]
    UnexpectedValue { token: String },

    #[error("expected one of '{expected}', found '{found}'")]
    ExpectedOneOf {
        expected: ExpectedTags,
        found: String,
    },

    #[error("invalid {kind} literal '{lexeme}'")]
    InvalidLiteral {
        kind: &'static str,
        lexeme: String,
    },
}

impl ParseError {
    /// True when the underlying failure happened in the tokenizer
    pub fn is_scan(&self) -> bool {
        matches!(self, ParseError::Scan(_))
    }
}

/// Query compilation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("or is not supported by this index")]
    OrNotSupported,

    #[error("operation {op} is not implemented for this index")]
    OpNotImplemented { op: CompOp },

    #[error("value type {value_type} is not applicable to {op} operation")]
    TypeNotApplicable {
        value_type: ValueType,
        op: CompOp,
    },

    #[error("cannot compare {kind} field '{field}' to {value_type} value")]
    KindMismatch {
        field: String,
        kind: FieldKind,
        value_type: ValueType,
    },

    #[error("failed to parse '{value}' as a date: {source}")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("unknown field '{field}'")]
    UnknownField { field: String },

    #[error("field is not filterable: '{field}'")]
    NotFilterable { field: String },
}
