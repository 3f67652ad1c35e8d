//! CLI command implementations

pub(crate) mod backfill;
pub(crate) mod common;
pub(crate) mod metadata;
pub(crate) mod model;
pub(crate) mod refresh;
pub(crate) mod schema;
pub(crate) mod snapshot;
