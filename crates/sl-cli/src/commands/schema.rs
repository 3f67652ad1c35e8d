//! Schema command implementation - print a store's tables and columns

use anyhow::{Context, Result};
use sl_model::extract_schema;

use crate::cli::{GlobalArgs, SchemaArgs};
use crate::context::RuntimeContext;

/// Execute the schema command
pub(crate) async fn execute(args: &SchemaArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let path = if args.derived {
        ctx.derived_store_path()
    } else {
        ctx.raw_store_path()
    };
    if !path.exists() {
        anyhow::bail!("Store {} does not exist yet", path.display());
    }

    let db = RuntimeContext::open_store(&path)?;
    let schema = extract_schema(db.as_ref())
        .await
        .context("Failed to read store schema")?;
    println!("{}", schema.to_json_pretty()?);
    Ok(())
}
