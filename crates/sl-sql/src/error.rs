//! Errors raised while reading model definitions

use thiserror::Error;

/// A model definition that cannot be understood as SQL
#[derive(Error, Debug)]
pub enum SqlError {
    /// S001: sqlparser rejected the text; location is 1-based, 0 when unknown
    #[error("[S001] Model SQL does not parse (line {line}, column {column}): {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// S002: nothing but whitespace
    #[error("[S002] Model definition contains no SQL")]
    Blank,
}

impl SqlError {
    /// Whether the definition was rejected by the parser rather than empty
    pub fn is_syntax(&self) -> bool {
        matches!(self, SqlError::Syntax { .. })
    }
}

pub type SqlResult<T> = Result<T, SqlError>;
