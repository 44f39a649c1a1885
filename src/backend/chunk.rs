//! Query builder for the legacy chunk index
//!
//! The chunk index stores whole episode chunks and only supports
//! conjunctive boolean queries: `and` compiles to nested `must` clauses and
//! `or` is a compile error. Equality on an integer becomes a point numeric
//! range; everything else equality-shaped becomes a phrase match on the
//! value's text form. String ranges compare lexicographically, which the
//! chunk index relies on for its zero-padded date fields.

use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::filter::{BoolFilter, BoolOp, CompFilter, CompOp, Filter, Value, Visitor};

/// Serializable query tree understood by the chunk index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkQuery {
    MatchAll,
    Boolean {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        must: Vec<ChunkQuery>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        must_not: Vec<ChunkQuery>,
    },
    MatchPhrase {
        field: String,
        phrase: String,
    },
    Match {
        field: String,
        text: String,
        fuzziness: u32,
    },
    NumericRange {
        field: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        inclusive_min: bool,
        inclusive_max: bool,
    },
    TermRange {
        field: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<String>,
        inclusive_min: bool,
        inclusive_max: bool,
    },
}

/// Compile a filter for the chunk index; `None` matches everything
pub fn filter_to_query(filter: Option<&Filter>) -> Result<ChunkQuery, CompileError> {
    match filter {
        None => Ok(ChunkQuery::MatchAll),
        Some(filter) => compile_boolean(filter),
    }
}

// Each subtree gets a fresh boolean accumulator, so conjunctions nest the
// same way the filter tree does.
fn compile_boolean(filter: &Filter) -> Result<ChunkQuery, CompileError> {
    let mut compiler = ChunkCompiler::default();
    filter.accept(&mut compiler)?;
    Ok(ChunkQuery::Boolean {
        must: compiler.must,
        must_not: compiler.must_not,
    })
}

#[derive(Default)]
struct ChunkCompiler {
    must: Vec<ChunkQuery>,
    must_not: Vec<ChunkQuery>,
}

impl Visitor for ChunkCompiler {
    type Error = CompileError;

    fn visit_comp(&mut self, filter: &CompFilter) -> Result<(), CompileError> {
        let condition = condition(&filter.field, filter.op, &filter.value)?;
        self.must.push(condition);
        Ok(())
    }

    fn visit_bool(&mut self, filter: &BoolFilter) -> Result<(), CompileError> {
        let lhs = compile_boolean(&filter.lhs)?;
        let rhs = compile_boolean(&filter.rhs)?;
        match filter.op {
            BoolOp::And => {
                self.must.push(lhs);
                self.must.push(rhs);
                Ok(())
            }
            BoolOp::Or => Err(CompileError::OrNotSupported),
        }
    }
}

fn condition(field: &str, op: CompOp, value: &Value) -> Result<ChunkQuery, CompileError> {
    match op {
        CompOp::Eq => Ok(eq_condition(field, value)),
        CompOp::Neq => Ok(ChunkQuery::Boolean {
            must: Vec::new(),
            must_not: vec![eq_condition(field, value)],
        }),
        CompOp::Like => Ok(ChunkQuery::Match {
            field: field.to_string(),
            text: value.text(),
            fuzziness: 0,
        }),
        CompOp::Gt | CompOp::Ge | CompOp::Lt | CompOp::Le => range_condition(field, op, value),
        CompOp::FuzzyLike => Err(CompileError::OpNotImplemented { op }),
    }
}

fn eq_condition(field: &str, value: &Value) -> ChunkQuery {
    match value {
        Value::Int(v) => ChunkQuery::NumericRange {
            field: field.to_string(),
            min: Some(*v as f64),
            max: Some(*v as f64),
            inclusive_min: true,
            inclusive_max: true,
        },
        other => ChunkQuery::MatchPhrase {
            field: field.to_string(),
            phrase: other.text(),
        },
    }
}

fn range_condition(field: &str, op: CompOp, value: &Value) -> Result<ChunkQuery, CompileError> {
    match value {
        Value::Int(v) => Ok(numeric_range(field, op, *v as f64)),
        Value::Float(v) => Ok(numeric_range(field, op, *v)),
        Value::String(s) => Ok(term_range(field, op, s.clone())),
        _ => Err(CompileError::TypeNotApplicable {
            value_type: value.value_type(),
            op,
        }),
    }
}

fn numeric_range(field: &str, op: CompOp, v: f64) -> ChunkQuery {
    let (min, max, inclusive_min, inclusive_max) = match op {
        CompOp::Gt => (Some(v), None, false, false),
        CompOp::Ge => (Some(v), None, true, false),
        CompOp::Lt => (None, Some(v), false, false),
        CompOp::Le => (None, Some(v), false, true),
        // callers only pass range operators
        _ => unreachable!("{} is not a range operator", op),
    };
    ChunkQuery::NumericRange {
        field: field.to_string(),
        min,
        max,
        inclusive_min,
        inclusive_max,
    }
}

fn term_range(field: &str, op: CompOp, s: String) -> ChunkQuery {
    let (min, max, inclusive_min, inclusive_max) = match op {
        CompOp::Gt => (Some(s), None, false, false),
        CompOp::Ge => (Some(s), None, true, false),
        CompOp::Lt => (None, Some(s), false, false),
        CompOp::Le => (None, Some(s), false, true),
        _ => unreachable!("{} is not a range operator", op),
    };
    ChunkQuery::TermRange {
        field: field.to_string(),
        min,
        max,
        inclusive_min,
        inclusive_max,
    }
}
