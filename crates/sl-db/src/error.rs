//! Store errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    /// D001: the store file (or in-memory store) could not be opened
    #[error("[D001] Cannot open store {target}: {message}")]
    Open { target: String, message: String },

    /// D002: DuckDB rejected a statement
    #[error("[D002] Store query failed: {message}")]
    Query { message: String },

    /// D003: statement referenced a relation the store does not have
    #[error("[D003] No such relation in store: {message}")]
    MissingRelation { message: String },

    /// D004: a frame could not be written to its staging table
    #[error("[D004] Failed to stage rows into '{table}': {message}")]
    Stage { table: String, message: String },

    /// D005: a previous holder of the connection panicked
    #[error("[D005] Store connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Append the offending statement to a query failure
    pub(crate) fn with_statement(self, sql: &str) -> Self {
        match self {
            DbError::Query { message } => DbError::Query {
                message: format!("{message}\n  in: {sql}"),
            },
            other => other,
        }
    }
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        let message = err.to_string();
        // Catalog errors arrive as plain text; only the "does not exist" family
        // is split out.
        let missing = message.contains("Catalog Error")
            && (message.contains("does not exist") || message.contains("not found"));
        if missing {
            DbError::MissingRelation { message }
        } else {
            DbError::Query { message }
        }
    }
}
