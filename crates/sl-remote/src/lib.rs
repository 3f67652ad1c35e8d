//! sl-remote - Remote data API client for sluice
//!
//! Entities are read over resource-oriented GET requests
//! (`$select`/`$top`/`$filter`) with basic authentication. The
//! [`RemoteSource`] trait is the seam the sync engines depend on;
//! [`HttpSource`] talks to the live service and [`MemorySource`] serves
//! canned responses for tests and dry runs.

pub mod client;
pub mod error;
pub mod memory;
pub mod metadata;
pub mod query;
pub mod retry;

pub use client::{HttpSource, RemoteSource};
pub use error::{RemoteError, RemoteResult};
pub use memory::MemorySource;
pub use metadata::{parse_metadata, MetadataTranslator};
pub use query::EntityQuery;
pub use retry::RetryPolicy;
