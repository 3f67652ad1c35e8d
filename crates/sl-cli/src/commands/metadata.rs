//! Metadata command implementation - print the field label mapping

use anyhow::{Context, Result};
use sl_core::MetadataMapping;

use crate::cli::{GlobalArgs, MetadataArgs};
use crate::context::{fetch_mappings, RuntimeContext};

/// Execute the metadata command
pub(crate) async fn execute(args: &MetadataArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let mappings = fetch_mappings(ctx.remote_source()?, &ctx.config).await?;
    let selected = select(mappings, &args.entities);
    println!(
        "{}",
        serde_json::to_string_pretty(&selected).context("Failed to render mapping")?
    );
    Ok(())
}

/// Keep only the named entities (case-insensitive); empty keeps all
fn select(mappings: MetadataMapping, entities: &[String]) -> MetadataMapping {
    if entities.is_empty() {
        return mappings;
    }
    mappings
        .into_iter()
        .filter(|(entity, _)| entities.iter().any(|e| e.eq_ignore_ascii_case(entity)))
        .collect()
}
