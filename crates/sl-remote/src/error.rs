//! Error types for sl-remote

use thiserror::Error;

/// Remote API errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Server-side failure that persisted through every retry (R001)
    #[error("[R001] Remote service unavailable after {attempts} attempts ({last}): {url}")]
    Unavailable {
        url: String,
        attempts: u32,
        last: String,
    },

    /// Client-side or authentication failure, never retried (R002)
    #[error("[R002] Remote service rejected the request with HTTP {status}: {url}")]
    Rejected { url: String, status: u16 },

    /// Request could not be sent or read (R003)
    #[error("[R003] Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Response body is not the expected record document (R004)
    #[error("[R004] Invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Metadata document could not be parsed (R005)
    #[error("[R005] Invalid metadata document: {0}")]
    Metadata(String),

    /// HTTP client could not be built (R006)
    #[error("[R006] Failed to build HTTP client: {0}")]
    Client(String),
}

/// Result type alias for RemoteError
pub type RemoteResult<T> = Result<T, RemoteError>;
