//! Error types for sl-sync

use sl_core::CoreError;
use sl_db::DbError;
use sl_remote::RemoteError;
use thiserror::Error;

/// Sync engine errors
#[derive(Error, Debug)]
pub enum SyncError {
    /// Remote fetch failed (Y001)
    #[error("[Y001] {0}")]
    Remote(#[from] RemoteError),

    /// Store operation failed (Y002)
    #[error("[Y002] {0}")]
    Db(#[from] DbError),

    /// Entity has no time field to partition on (Y003)
    #[error("[Y003] Entity '{entity}' has no time_field; it can only be loaded as a snapshot")]
    NotPartitioned { entity: String },

    /// Target table lacks the column the window delete filters on (Y004)
    #[error("[Y004] Table '{table}' has no time column '{column}'")]
    MissingTimeColumn { table: String, column: String },

    /// Core error (Y005)
    #[error("[Y005] {0}")]
    Core(#[from] CoreError),
}

/// Result type alias for SyncError
pub type SyncResult<T> = Result<T, SyncError>;
