//! Query compilers for the stores that execute filters
//!
//! Each backend walks the [`Filter`](crate::filter::Filter) tree with a
//! [`Visitor`](crate::filter::Visitor) and accumulates its own query shape:
//!
//! * [`chunk`] targets the legacy chunk index (conjunctive queries only)
//! * [`dialog`] targets the per-line dialog index (full boolean search,
//!   schema-directed equality)
//! * [`sql`] targets the relational store (parameterized `WHERE` fragments)
//!
//! The compilers are deliberately strict: anything an index cannot execute
//! is a [`CompileError`](crate::error::CompileError) at compile time, never
//! a silently narrowed query.

pub mod chunk;
pub mod dialog;
pub mod sql;

pub use chunk::ChunkQuery;
pub use dialog::DialogQuery;
pub use sql::filter_to_sql;
