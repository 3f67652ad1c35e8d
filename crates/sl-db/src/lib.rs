//! sl-db - Analytical store layer for sluice
//!
//! This crate provides the `Database` trait the sync engines and the
//! materializer write through, and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
