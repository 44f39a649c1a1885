//! Natural-language search front-end
//!
//! End users type `@steve ~xfm "man alive" karl` rather than the filter DSL.
//! This module parses that form into a flat list of [`Term`]s and folds the
//! list into a regular [`Filter`](crate::filter::Filter) so the rest of the
//! pipeline is shared with the DSL.
//!
//! # Example
//!
//! ```rust
//! use verbatim::filter::print;
//! use verbatim::terms;
//!
//! let parsed = terms::parse("@steve karl").unwrap();
//! let filter = terms::terms_to_filter(&parsed).unwrap();
//! assert_eq!(print(&filter), r#"actor = "steve" and content ~ "karl""#);
//! ```

use serde::{Deserialize, Serialize};

use crate::filter::{CompFilter, CompOp, Filter};

pub mod parser;
pub mod scanner;

pub use parser::parse;

/// One search term: a field, a string value, and the comparison to apply
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub field: String,
    pub value: String,
    pub op: CompOp,
}

impl Term {
    pub fn new(field: impl Into<String>, value: impl Into<String>, op: CompOp) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            op,
        }
    }
}

/// Fold terms left-to-right into a single `and` filter
///
/// Term values are always string literals; an empty term list means "no
/// filter" and returns `None`.
pub fn terms_to_filter(terms: &[Term]) -> Option<Filter> {
    terms
        .iter()
        .map(|term| Filter::Comp(CompFilter::new(term.field.clone(), term.op, term.value.clone())))
        .reduce(Filter::and)
}
