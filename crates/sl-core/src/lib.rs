//! sl-core - Core library for sluice
//!
//! This crate provides the shared vocabulary of the sync and materialization
//! engines: the `sluice.yml` configuration, entity descriptors, field
//! mappings, monthly partition windows, tabular frames, schema snapshots,
//! and SQL quoting helpers.

pub mod config;
pub mod entity;
pub mod error;
pub mod frame;
pub mod mapping;
pub mod names;
mod newtype_string;
pub mod schema;
pub mod sql_utils;
pub mod window;

pub use config::{AliasLabels, Config, Credentials, MaterializeConfig, RemoteConfig, StoresConfig};
pub use entity::{EntityDescriptor, SplitSpec, SyncMode};
pub use error::{CoreError, CoreResult};
pub use frame::{ColumnKind, Frame};
pub use mapping::{normalize_label, FieldMapping, MetadataMapping};
pub use names::{EntityName, ModelName, TableName};
pub use schema::{ColumnInfo, RawSchema, TableSchema};
pub use window::{MonthRange, PartitionWindow, YearMonth};
