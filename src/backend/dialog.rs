//! Query builder for the dialog index
//!
//! The dialog index stores one document per spoken line and supports full
//! boolean search: `and` feeds `must` clauses, `or` feeds `should` clauses.
//! Equality dispatches on the schema kind of the field, so `actor = "steve"`
//! becomes an exact term query while `content = "man alive"` becomes a
//! phrase query and `date = "2020-01-08T00:00:00Z"` becomes a single-day
//! date range. Range queries fill the unbounded side with a sentinel
//! (`f64::MAX` or the empty string) rather than leaving it open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CompileError;
use crate::filter::{BoolFilter, BoolOp, CompFilter, CompOp, Filter, Value, Visitor};
use crate::schema::{FieldKind, SearchSchema};

/// Serializable query tree understood by the dialog index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogQuery {
    MatchAll,
    Boolean {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        must: Vec<DialogQuery>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        should: Vec<DialogQuery>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        must_not: Vec<DialogQuery>,
    },
    Term {
        field: String,
        term: String,
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
        min: f64,
        max: f64,
        inclusive_min: bool,
        inclusive_max: bool,
    },
    TermRange {
        field: String,
        min: String,
        max: String,
        inclusive_min: bool,
        inclusive_max: bool,
    },
    DateRange {
        field: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        inclusive_start: bool,
        inclusive_end: bool,
    },
}

/// Compile a filter for the dialog index; `None` matches everything
pub fn filter_to_query(
    filter: Option<&Filter>,
    schema: &SearchSchema,
) -> Result<DialogQuery, CompileError> {
    match filter {
        None => Ok(DialogQuery::MatchAll),
        Some(filter) => compile_boolean(filter, schema),
    }
}

fn compile_boolean(filter: &Filter, schema: &SearchSchema) -> Result<DialogQuery, CompileError> {
    let mut compiler = DialogCompiler {
        schema,
        must: Vec::new(),
        should: Vec::new(),
        must_not: Vec::new(),
    };
    filter.accept(&mut compiler)?;
    Ok(DialogQuery::Boolean {
        must: compiler.must,
        should: compiler.should,
        must_not: compiler.must_not,
    })
}

struct DialogCompiler<'a> {
    schema: &'a SearchSchema,
    must: Vec<DialogQuery>,
    should: Vec<DialogQuery>,
    must_not: Vec<DialogQuery>,
}

impl Visitor for DialogCompiler<'_> {
    type Error = CompileError;

    fn visit_comp(&mut self, filter: &CompFilter) -> Result<(), CompileError> {
        let condition = self.condition(&filter.field, filter.op, &filter.value)?;
        self.must.push(condition);
        Ok(())
    }

    fn visit_bool(&mut self, filter: &BoolFilter) -> Result<(), CompileError> {
        let lhs = compile_boolean(&filter.lhs, self.schema)?;
        let rhs = compile_boolean(&filter.rhs, self.schema)?;
        match filter.op {
            BoolOp::And => {
                self.must.push(lhs);
                self.must.push(rhs);
            }
            BoolOp::Or => {
                self.should.push(lhs);
                self.should.push(rhs);
            }
        }
        Ok(())
    }
}

impl DialogCompiler<'_> {
    fn condition(
        &self,
        field: &str,
        op: CompOp,
        value: &Value,
    ) -> Result<DialogQuery, CompileError> {
        match op {
            CompOp::Eq => self.eq_condition(field, value),
            CompOp::Neq => Ok(DialogQuery::Boolean {
                must: Vec::new(),
                should: Vec::new(),
                must_not: vec![self.eq_condition(field, value)?],
            }),
            CompOp::Like => Ok(DialogQuery::Match {
                field: field.to_string(),
                text: value.text(),
                fuzziness: 0,
            }),
            CompOp::FuzzyLike => Ok(DialogQuery::Match {
                field: field.to_string(),
                text: value.text(),
                fuzziness: 1,
            }),
            CompOp::Gt | CompOp::Ge | CompOp::Lt | CompOp::Le => range_condition(field, op, value),
        }
    }

    // Equality needs the schema: the right query shape depends on how the
    // field is indexed, not on the value alone.
    fn eq_condition(&self, field: &str, value: &Value) -> Result<DialogQuery, CompileError> {
        let Some(kind) = self.schema.kind_of(field) else {
            return Err(CompileError::UnknownField {
                field: field.to_string(),
            });
        };
        let mismatch = || CompileError::KindMismatch {
            field: field.to_string(),
            kind,
            value_type: value.value_type(),
        };
        match kind {
            FieldKind::Text => {
                let text = value.as_str().ok_or_else(mismatch)?;
                Ok(DialogQuery::MatchPhrase {
                    field: field.to_string(),
                    phrase: text.to_string(),
                })
            }
            FieldKind::Keyword => {
                let term = value.as_str().ok_or_else(mismatch)?;
                Ok(DialogQuery::Term {
                    field: field.to_string(),
                    term: term.to_string(),
                })
            }
            FieldKind::Number => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                Ok(DialogQuery::NumericRange {
                    field: field.to_string(),
                    min: v,
                    max: v,
                    inclusive_min: true,
                    inclusive_max: true,
                })
            }
            FieldKind::Date => {
                let raw = value.as_str().ok_or_else(mismatch)?;
                let ts = DateTime::parse_from_rfc3339(raw)
                    .map_err(|source| CompileError::InvalidDate {
                        value: raw.to_string(),
                        source,
                    })?
                    .with_timezone(&Utc);
                Ok(DialogQuery::DateRange {
                    field: field.to_string(),
                    start: ts,
                    end: ts,
                    inclusive_start: true,
                    inclusive_end: true,
                })
            }
        }
    }
}

fn range_condition(field: &str, op: CompOp, value: &Value) -> Result<DialogQuery, CompileError> {
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

fn numeric_range(field: &str, op: CompOp, v: f64) -> DialogQuery {
    let (min, max, inclusive_min, inclusive_max) = match op {
        CompOp::Gt => (v, f64::MAX, false, false),
        CompOp::Ge => (v, f64::MAX, true, true),
        CompOp::Lt => (-f64::MAX, v, false, false),
        CompOp::Le => (-f64::MAX, v, true, true),
        _ => unreachable!("{} is not a range operator", op),
    };
    DialogQuery::NumericRange {
        field: field.to_string(),
        min,
        max,
        inclusive_min,
        inclusive_max,
    }
}

fn term_range(field: &str, op: CompOp, s: String) -> DialogQuery {
    let (min, max, inclusive_min, inclusive_max) = match op {
        CompOp::Gt => (s, String::new(), false, false),
        CompOp::Ge => (s, String::new(), true, true),
        CompOp::Lt => (String::new(), s, false, false),
        CompOp::Le => (String::new(), s, true, true),
        _ => unreachable!("{} is not a range operator", op),
    };
    DialogQuery::TermRange {
        field: field.to_string(),
        min,
        max,
        inclusive_min,
        inclusive_max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{parse, ValueType};
    use serde_json::json;

    fn compile(input: &str) -> Result<DialogQuery, CompileError> {
        let filter = parse(input).unwrap();
        filter_to_query(filter.as_ref(), &SearchSchema::transcript())
    }

    fn must(conditions: Vec<DialogQuery>) -> DialogQuery {
        DialogQuery::Boolean {
            must: conditions,
            should: Vec::new(),
            must_not: Vec::new(),
        }
    }

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_no_filter_matches_all() {
        assert_eq!(
            filter_to_query(None, &SearchSchema::transcript()).unwrap(),
            DialogQuery::MatchAll
        );
    }

    #[test]
    fn test_eq_on_text_is_a_phrase() {
        assert_eq!(
            compile(r#"content = "man alive""#).unwrap(),
            must(vec![DialogQuery::MatchPhrase {
                field: "content".to_string(),
                phrase: "man alive".to_string(),
            }])
        );
    }

    #[test]
    fn test_eq_on_keyword_is_a_term() {
        assert_eq!(
            compile(r#"actor = "steve""#).unwrap(),
            must(vec![DialogQuery::Term {
                field: "actor".to_string(),
                term: "steve".to_string(),
            }])
        );
    }

    #[test]
    fn test_eq_on_number_is_a_point_range() {
        assert_eq!(
            compile("series = 2").unwrap(),
            must(vec![DialogQuery::NumericRange {
                field: "series".to_string(),
                min: 2.0,
                max: 2.0,
                inclusive_min: true,
                inclusive_max: true,
            }])
        );
        assert_eq!(
            compile("series = 2.5").unwrap(),
            must(vec![DialogQuery::NumericRange {
                field: "series".to_string(),
                min: 2.5,
                max: 2.5,
                inclusive_min: true,
                inclusive_max: true,
            }])
        );
    }

    #[test]
    fn test_eq_on_date_is_a_point_date_range() {
        let ts = utc("2020-01-08T00:00:00Z");
        assert_eq!(
            compile(r#"date = "2020-01-08T00:00:00Z""#).unwrap(),
            must(vec![DialogQuery::DateRange {
                field: "date".to_string(),
                start: ts,
                end: ts,
                inclusive_start: true,
                inclusive_end: true,
            }])
        );
    }

    #[test]
    fn test_eq_with_unparseable_date_fails() {
        let err = compile(r#"date = "January 8th""#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidDate { ref value, .. } if value == "January 8th"));
        assert!(err.to_string().starts_with("failed to parse 'January 8th' as a date"));
    }

    #[test]
    fn test_eq_kind_mismatches_fail() {
        assert_eq!(
            compile("content = 5").unwrap_err(),
            CompileError::KindMismatch {
                field: "content".to_string(),
                kind: FieldKind::Text,
                value_type: ValueType::Int,
            }
        );
        assert_eq!(
            compile(r#"series = "two""#).unwrap_err(),
            CompileError::KindMismatch {
                field: "series".to_string(),
                kind: FieldKind::Number,
                value_type: ValueType::String,
            }
        );
        assert_eq!(
            compile("date = 20200108").unwrap_err(),
            CompileError::KindMismatch {
                field: "date".to_string(),
                kind: FieldKind::Date,
                value_type: ValueType::Int,
            }
        );
    }

    #[test]
    fn test_eq_on_unmapped_field_fails() {
        assert_eq!(
            compile(r#"speaker = "steve""#).unwrap_err(),
            CompileError::UnknownField {
                field: "speaker".to_string(),
            }
        );
    }

    #[test]
    fn test_neq_wraps_the_eq_translation() {
        assert_eq!(
            compile(r#"actor != "steve""#).unwrap(),
            must(vec![DialogQuery::Boolean {
                must: Vec::new(),
                should: Vec::new(),
                must_not: vec![DialogQuery::Term {
                    field: "actor".to_string(),
                    term: "steve".to_string(),
                }],
            }])
        );
    }

    #[test]
    fn test_like_and_fuzzy_like_differ_only_in_fuzziness() {
        assert_eq!(
            compile(r#"content ~= "karl""#).unwrap(),
            must(vec![DialogQuery::Match {
                field: "content".to_string(),
                text: "karl".to_string(),
                fuzziness: 0,
            }])
        );
        assert_eq!(
            compile(r#"content ~ "karl""#).unwrap(),
            must(vec![DialogQuery::Match {
                field: "content".to_string(),
                text: "karl".to_string(),
                fuzziness: 1,
            }])
        );
    }

    #[test]
    fn test_match_queries_skip_the_schema() {
        // only equality is kind-directed, so match queries run on any field
        assert!(compile(r#"speaker ~ "steve""#).is_ok());
    }

    #[test]
    fn test_numeric_range_sentinels() {
        assert_eq!(
            compile("series > 2").unwrap(),
            must(vec![DialogQuery::NumericRange {
                field: "series".to_string(),
                min: 2.0,
                max: f64::MAX,
                inclusive_min: false,
                inclusive_max: false,
            }])
        );
        assert_eq!(
            compile("series <= 3").unwrap(),
            must(vec![DialogQuery::NumericRange {
                field: "series".to_string(),
                min: -f64::MAX,
                max: 3.0,
                inclusive_min: true,
                inclusive_max: true,
            }])
        );
    }

    #[test]
    fn test_string_range_sentinels() {
        assert_eq!(
            compile(r#"date >= "2020-01-01""#).unwrap(),
            must(vec![DialogQuery::TermRange {
                field: "date".to_string(),
                min: "2020-01-01".to_string(),
                max: String::new(),
                inclusive_min: true,
                inclusive_max: true,
            }])
        );
    }

    #[test]
    fn test_range_on_bool_is_rejected() {
        assert_eq!(
            compile("flagged < true").unwrap_err(),
            CompileError::TypeNotApplicable {
                value_type: ValueType::Bool,
                op: CompOp::Lt,
            }
        );
    }

    #[test]
    fn test_and_feeds_must_and_or_feeds_should() {
        assert_eq!(
            compile(r#"actor = "steve" or actor = "karl""#).unwrap(),
            DialogQuery::Boolean {
                must: Vec::new(),
                should: vec![
                    must(vec![DialogQuery::Term {
                        field: "actor".to_string(),
                        term: "steve".to_string(),
                    }]),
                    must(vec![DialogQuery::Term {
                        field: "actor".to_string(),
                        term: "karl".to_string(),
                    }]),
                ],
                must_not: Vec::new(),
            }
        );
    }

    #[test]
    fn test_mixed_boolean_nesting() {
        let query = compile(r#"series = 2 and (actor = "steve" or actor = "karl")"#).unwrap();
        let DialogQuery::Boolean { must, should, must_not } = query else {
            panic!("expected a boolean query");
        };
        assert_eq!(must.len(), 2);
        assert!(should.is_empty());
        assert!(must_not.is_empty());
        let DialogQuery::Boolean { should: inner, .. } = &must[1] else {
            panic!("expected the rhs to be a boolean query");
        };
        assert_eq!(inner.len(), 2);
    }

    #[test]
    fn test_query_serialization_shape() {
        let query = compile(r#"actor = "steve""#).unwrap();
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "boolean": {
                    "must": [{
                        "term": { "field": "actor", "term": "steve" }
                    }]
                }
            })
        );
    }
}
