//! Field kinds and query-time mappings
//!
//! [`SearchSchema`] tells the dialog index compiler how each field is
//! indexed, which decides what equality means for it (phrase match, term
//! match, point range, date range). [`ColumnMap`] tells the relational
//! backend which SQL column or expression a filterable field refers to.
//! Both are plain lookup tables with builder-style construction.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How a search-index field is indexed and therefore how it can be compared
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Analyzed full text; equality is a phrase match
    Text,
    /// Exact single-term values
    Keyword,
    /// Integers and floats; equality is a point range
    Number,
    /// RFC 3339 timestamps
    Date,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Keyword => "keyword",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-name to kind table for a search index
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchSchema {
    fields: HashMap<String, FieldKind>,
}

impl SearchSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field, replacing any previous kind
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    /// The standard dialog-index schema: one entry per transcript line
    /// plus its episode metadata
    pub fn transcript() -> Self {
        Self::new()
            .field("transcript_id", FieldKind::Keyword)
            .field("publication", FieldKind::Keyword)
            .field("series", FieldKind::Number)
            .field("episode", FieldKind::Number)
            .field("date", FieldKind::Date)
            .field("actor", FieldKind::Keyword)
            .field("pos", FieldKind::Number)
            .field("content", FieldKind::Text)
            .field("type", FieldKind::Keyword)
    }
}

/// Filterable-field to SQL column/expression table
///
/// Values are spliced into generated SQL verbatim, so they can be qualified
/// columns (`b.bar`) or expressions; only the map's own values ever reach
/// the SQL text, never user input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnMap {
    columns: HashMap<String, String>,
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.columns.insert(field.into(), column.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.columns.get(field).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_schema_kinds() {
        let schema = SearchSchema::transcript();
        assert_eq!(schema.kind_of("content"), Some(FieldKind::Text));
        assert_eq!(schema.kind_of("actor"), Some(FieldKind::Keyword));
        assert_eq!(schema.kind_of("series"), Some(FieldKind::Number));
        assert_eq!(schema.kind_of("date"), Some(FieldKind::Date));
        assert_eq!(schema.kind_of("nonsense"), None);
    }

    #[test]
    fn test_field_builder_replaces() {
        let schema = SearchSchema::new()
            .field("a", FieldKind::Text)
            .field("a", FieldKind::Keyword);
        assert_eq!(schema.kind_of("a"), Some(FieldKind::Keyword));
    }

    #[test]
    fn test_column_map_lookup() {
        let columns = ColumnMap::new()
            .column("foo", "foo")
            .column("bar", "b.bar");
        assert_eq!(columns.get("bar"), Some("b.bar"));
        assert_eq!(columns.get("baz"), None);
    }

    #[test]
    fn test_field_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FieldKind::Keyword).unwrap(),
            "\"keyword\""
        );
    }
}
