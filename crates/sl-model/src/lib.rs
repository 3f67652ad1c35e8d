//! sl-model - Derived layer for sluice
//!
//! Model definitions (templated SQL files) are proposed from the raw
//! schema, written to the models directory, and materialized into the
//! derived store on top of read-only views of the raw store. Each run then
//! coerces date-named columns, rebuilds the column alias table, and infers
//! fact-to-dimension join hints.

pub mod aliases;
pub mod artifacts;
pub mod coercion;
pub mod error;
pub mod hints;
pub mod materializer;
pub mod order;
pub mod proposer;
pub mod template;

pub use aliases::{derive_aliases, write_alias_table, AliasEntry, ALIAS_TABLE};
pub use artifacts::{extract_schema, reset_workspace, write_model_files};
pub use coercion::coerce_date_columns;
pub use error::{ModelError, ModelResult};
pub use hints::{derive_join_hints, write_hints, JoinHint};
pub use materializer::{MaterializeReport, Materializer, RAW_ALIAS};
pub use order::ModelGraph;
pub use proposer::{
    parse_generator_output, CommandProposer, DirectoryProposer, ModelFile, ModelProposer,
    StagingProposer,
};
pub use template::{strip_templating, to_statement};
