pub mod backend;
pub mod error;
pub mod filter;
pub mod schema;
pub mod terms;

pub use backend::{filter_to_sql, ChunkQuery, DialogQuery};
pub use error::{CompileError, ParseError, ScanError};
pub use filter::{
    parse, print, BoolFilter, BoolOp, CompFilter, CompOp, Filter, Value, ValueType, Visitor,
};
pub use schema::{ColumnMap, FieldKind, SearchSchema};
pub use terms::{terms_to_filter, Term};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
