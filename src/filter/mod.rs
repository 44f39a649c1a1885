//! Typed filter expressions
//!
//! A filter is a tree with exactly two node kinds: comparison leaves
//! (`actor = "steve"`) and boolean nodes joining two subtrees with `and` or
//! `or`. Everything that consumes a filter — the printer, the index query
//! builders, the SQL backend — is a [`Visitor`] over those two kinds.
//!
//! # Example
//!
//! ```rust
//! use verbatim::filter::{parse, print, Filter};
//!
//! let filter = parse(r#"actor = "steve" and series > 2"#).unwrap().unwrap();
//! assert_eq!(
//!     filter,
//!     Filter::and(Filter::eq("actor", "steve"), Filter::gt("series", 2)),
//! );
//! assert_eq!(print(&filter), r#"actor = "steve" and series > 2"#);
//! ```

use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod parser;
pub mod printer;
pub mod scanner;
pub mod value;

pub use parser::parse;
pub use printer::{print, write_filter};
pub use value::{Value, ValueType};

/// Comparison operator of a [`CompFilter`] leaf
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    /// `~=` — match without fuzziness
    #[serde(rename = "~=")]
    Like,
    /// `~` — match with fuzziness where the backend supports it
    #[serde(rename = "~")]
    FuzzyLike,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CompOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompOp::Eq => "=",
            CompOp::Neq => "!=",
            CompOp::Like => "~=",
            CompOp::FuzzyLike => "~",
            CompOp::Lt => "<",
            CompOp::Le => "<=",
            CompOp::Gt => ">",
            CompOp::Ge => ">=",
        }
    }

    /// Comparisons bind tighter than any boolean operator
    pub fn precedence(&self) -> u8 {
        3
    }
}

impl fmt::Display for CompOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean operator of a [`BoolFilter`] node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "and",
            BoolOp::Or => "or",
        }
    }

    /// `and` binds tighter than `or`
    pub fn precedence(&self) -> u8 {
        match self {
            BoolOp::And => 2,
            BoolOp::Or => 1,
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison leaf: `field op value`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompFilter {
    pub field: String,
    pub op: CompOp,
    pub value: Value,
}

impl CompFilter {
    pub fn new(field: impl Into<String>, op: CompOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

/// Boolean node joining two subtrees
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoolFilter {
    pub lhs: Box<Filter>,
    pub op: BoolOp,
    pub rhs: Box<Filter>,
}

impl BoolFilter {
    pub fn new(lhs: Filter, op: BoolOp, rhs: Filter) -> Self {
        Self {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
        }
    }
}

/// A filter expression tree
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Comp(CompFilter),
    Bool(BoolFilter),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Eq, value))
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Neq, value))
    }

    pub fn like(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Like, value))
    }

    pub fn fuzzy_like(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::FuzzyLike, value))
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Lt, value))
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Le, value))
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Gt, value))
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Filter {
        Filter::Comp(CompFilter::new(field, CompOp::Ge, value))
    }

    pub fn and(lhs: Filter, rhs: Filter) -> Filter {
        Filter::Bool(BoolFilter::new(lhs, BoolOp::And, rhs))
    }

    pub fn or(lhs: Filter, rhs: Filter) -> Filter {
        Filter::Bool(BoolFilter::new(lhs, BoolOp::Or, rhs))
    }

    /// Precedence of the node's operator, used by the printer to decide
    /// where parentheses are required
    pub fn precedence(&self) -> u8 {
        match self {
            Filter::Comp(f) => f.op.precedence(),
            Filter::Bool(f) => f.op.precedence(),
        }
    }

    /// Dispatch this node to the visitor
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self {
            Filter::Comp(f) => visitor.visit_comp(f),
            Filter::Bool(f) => visitor.visit_bool(f),
        }
    }
}

/// Double dispatch over the two filter node kinds
///
/// [`Filter::accept`] dispatches a single node; descending into the children
/// of a [`BoolFilter`] is the visitor's own job, typically by recursing with
/// a fresh sub-accumulator per side.
pub trait Visitor {
    type Error;

    fn visit_comp(&mut self, filter: &CompFilter) -> Result<(), Self::Error>;

    fn visit_bool(&mut self, filter: &BoolFilter) -> Result<(), Self::Error>;
}

struct CompFilterExtractor<'a> {
    field: &'a str,
    found: Vec<CompFilter>,
}

impl Visitor for CompFilterExtractor<'_> {
    type Error = Infallible;

    fn visit_comp(&mut self, filter: &CompFilter) -> Result<(), Infallible> {
        if filter.field == self.field {
            self.found.push(filter.clone());
        }
        Ok(())
    }

    fn visit_bool(&mut self, filter: &BoolFilter) -> Result<(), Infallible> {
        filter.lhs.accept(self)?;
        filter.rhs.accept(self)
    }
}

/// Collect every comparison on `field`, in left-to-right source order
///
/// Used by the service layer to react to filters on particular fields
/// without caring about the surrounding boolean structure.
pub fn extract_comp_filters(filter: &Filter, field: &str) -> Vec<CompFilter> {
    let mut extractor = CompFilterExtractor {
        field,
        found: Vec::new(),
    };
    match filter.accept(&mut extractor) {
        Ok(()) => extractor.found,
        Err(never) => match never {},
    }
}
