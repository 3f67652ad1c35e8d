//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// sluice - sync remote ERP entities into DuckDB and build a derived layer
#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Remote API user
    #[arg(long, global = true, env = "PRIORITY_USER")]
    pub user: Option<String>,

    /// Remote API password
    #[arg(long, global = true, env = "PRIORITY_PASS", hide_env_values = true)]
    pub password: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch remote metadata and print the field label mapping as JSON
    Metadata(MetadataArgs),

    /// Load an inclusive month range for entities with a time field
    Backfill(BackfillArgs),

    /// Replace snapshot tables for entities without a time field
    Snapshot(SnapshotArgs),

    /// Snapshot all reference entities and re-sync the current month
    Refresh,

    /// Print a store's schema as JSON
    Schema(SchemaArgs),

    /// Propose, write and materialize the derived models
    Model(ModelArgs),
}

/// Arguments for the metadata command
#[derive(Args, Debug)]
pub struct MetadataArgs {
    /// Only print these entities
    pub entities: Vec<String>,
}

/// Arguments for the backfill command
#[derive(Args, Debug)]
pub struct BackfillArgs {
    /// First month, YYYY-MM
    pub start: String,

    /// Last month (inclusive), YYYY-MM
    pub end: String,

    /// Restrict to these entities (default: every entity with a time field)
    pub entities: Vec<String>,
}

/// Arguments for the snapshot command
#[derive(Args, Debug)]
pub struct SnapshotArgs {
    /// Restrict to these entities (default: every snapshot entity)
    pub entities: Vec<String>,
}

/// Arguments for the schema command
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Describe the derived store instead of the raw one
    #[arg(long)]
    pub derived: bool,
}

/// Arguments for the model command
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Override the models directory
    #[arg(short, long)]
    pub models_dir: Option<String>,

    /// Generator command (raw schema JSON on stdin, files JSON on stdout)
    #[arg(short, long)]
    pub generator: Option<String>,

    /// Materialize the files already in the models directory
    #[arg(short, long, conflicts_with = "generator")]
    pub keep: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
