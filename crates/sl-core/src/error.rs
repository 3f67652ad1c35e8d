//! Error types for sl-core

use thiserror::Error;

/// Core error type for sluice
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Month argument is not `YYYY-MM`
    #[error("[E004] Invalid month '{value}': expected YYYY-MM")]
    InvalidMonth { value: String },

    /// E005: Month range runs backwards
    #[error("[E005] Invalid month range: {start} is after {end}")]
    InvalidMonthRange { start: String, end: String },

    /// E006: Entity name not present in the configured entity set
    #[error("[E006] Unknown entity: {name}")]
    UnknownEntity { name: String },

    /// E007: Remote response could not be turned into a frame
    #[error("[E007] Malformed record set: {message}")]
    MalformedRecords { message: String },

    /// E008: Credentials missing from flags, environment, and config
    #[error("[E008] Missing credentials: {message}")]
    MissingCredentials { message: String },

    /// E009: Empty name where a name is required
    #[error("[E009] Empty name for {context}")]
    EmptyName { context: String },

    /// E010: IO error with file path context
    #[error("[E010] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
