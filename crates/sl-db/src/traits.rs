//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sl_core::{ColumnInfo, Frame};

/// Analytical store abstraction.
///
/// Table and view names are passed bare; implementations quote them, since
/// labels are frequently non-ASCII. Every call is its own implicit
/// transaction.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returning affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute several `;`-separated statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Create a table from a SELECT
    async fn create_table_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()>;

    /// Create a view from a SELECT
    async fn create_view_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()>;

    /// Whether a table or view exists in the main schema
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Number of rows a query returns
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// First column of the first row, rendered as text
    async fn query_one(&self, sql: &str) -> DbResult<Option<String>>;

    /// Drop a table or view if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Columns of a table or view in declaration order
    async fn table_columns(&self, name: &str) -> DbResult<Vec<ColumnInfo>>;

    /// Tables and views of the main schema, ordered by name
    async fn list_tables(&self) -> DbResult<Vec<String>>;

    /// Replace `table` with the contents of a frame, returning rows written
    async fn load_frame(&self, table: &str, frame: &Frame) -> DbResult<usize>;

    /// Attach another store file read-only under `alias`
    async fn attach_read_only(&self, path: &str, alias: &str) -> DbResult<()>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
