//! Error types for sl-model

use sl_db::DbError;
use thiserror::Error;

/// Materialization errors; all of them abort the run
#[derive(Error, Debug)]
pub enum ModelError {
    /// Store operation failed (M001)
    #[error("[M001] {0}")]
    Db(#[from] DbError),

    /// Model statement failed to execute (M002)
    #[error("[M002] Model '{model}' failed: {source}")]
    Execution {
        model: String,
        #[source]
        source: DbError,
    },

    /// Model references a relation that does not exist (M003)
    #[error("[M003] Schema mismatch in '{model}': missing {}", missing.join(", "))]
    SchemaMismatch { model: String, missing: Vec<String> },

    /// Models reference each other in a cycle (M004)
    #[error("[M004] Circular dependency between models: {cycle}")]
    CircularDependency { cycle: String },

    /// Generator command failed or returned unusable output (M005)
    #[error("[M005] Model generator failed: {0}")]
    Generator(String),

    /// IO error with path context (M006)
    #[error("[M006] {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON error (M007)
    #[error("[M007] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error (M008)
    #[error("[M008] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generated file name points outside the models directory (M009)
    #[error("[M009] Model file '{0}' escapes the models directory")]
    UnsafePath(String),
}

impl ModelError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        ModelError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for ModelError
pub type ModelResult<T> = Result<T, ModelError>;
