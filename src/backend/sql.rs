//! WHERE-clause builder for the relational store
//!
//! Compiles a filter into a parameterized Postgres fragment plus the
//! parameter vector, numbering placeholders `$1..$n` in the order the tree
//! is walked. Values never end up inside the SQL text; the only identifiers
//! spliced in come from the caller's [`ColumnMap`].

use crate::error::CompileError;
use crate::filter::{BoolFilter, CompFilter, CompOp, Filter, Value, Visitor};
use crate::schema::ColumnMap;

/// Compile a filter into a `WHERE` fragment and its parameters
pub fn filter_to_sql(
    filter: &Filter,
    columns: &ColumnMap,
) -> Result<(String, Vec<Value>), CompileError> {
    let mut compiler = SqlCompiler {
        columns,
        sql: String::new(),
        params: Vec::new(),
    };
    filter.accept(&mut compiler)?;
    Ok((compiler.sql, compiler.params))
}

struct SqlCompiler<'a> {
    columns: &'a ColumnMap,
    sql: String,
    params: Vec<Value>,
}

impl SqlCompiler<'_> {
    fn next_param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn push_clause(&mut self, clause: &str) {
        self.sql.push_str(clause);
    }
}

impl Visitor for SqlCompiler<'_> {
    type Error = CompileError;

    fn visit_comp(&mut self, filter: &CompFilter) -> Result<(), CompileError> {
        let Some(col) = self.columns.get(&filter.field) else {
            return Err(CompileError::NotFilterable {
                field: filter.field.clone(),
            });
        };
        let col = col.to_string();
        match filter.op {
            CompOp::Eq => {
                if filter.value.is_null() {
                    self.push_clause(&format!("{col} IS NULL"));
                } else {
                    let p = self.next_param(filter.value.clone());
                    self.push_clause(&format!("{col} = {p}"));
                }
            }
            CompOp::Neq => {
                if filter.value.is_null() {
                    self.push_clause(&format!("{col} IS NOT NULL"));
                } else {
                    let p = self.next_param(filter.value.clone());
                    self.push_clause(&format!("{col} != {p}"));
                }
            }
            CompOp::Gt | CompOp::Ge | CompOp::Lt | CompOp::Le => {
                let p = self.next_param(filter.value.clone());
                self.push_clause(&format!("{col} {} {p}", filter.op));
            }
            CompOp::Like => {
                let p = self.next_param(contains_pattern(&filter.value));
                self.push_clause(&format!("{col} LIKE {p}"));
            }
            CompOp::FuzzyLike => {
                // case-insensitive contains is as fuzzy as plain SQL gets
                let p = self.next_param(contains_pattern(&filter.value));
                self.push_clause(&format!("{col} ILIKE {p}"));
            }
        }
        Ok(())
    }

    fn visit_bool(&mut self, filter: &BoolFilter) -> Result<(), CompileError> {
        self.push_clause("(");
        filter.lhs.accept(self)?;
        self.push_clause(&format!(") {} (", filter.op));
        filter.rhs.accept(self)?;
        self.push_clause(")");
        Ok(())
    }
}

fn contains_pattern(value: &Value) -> Value {
    Value::String(format!("%{}%", value.text()))
}
