//! sl-sql - SQL parsing layer for sluice
//!
//! Model definitions are parsed with sqlparser-rs (DuckDB dialect) so the
//! materializer can check their table references against the raw store and
//! order them by dependency before executing anything.

pub mod error;
pub mod extractor;
pub mod parser;

pub use error::{SqlError, SqlResult};
pub use extractor::{defined_ctes, referenced_tables};
pub use parser::{is_create, SqlParser};
