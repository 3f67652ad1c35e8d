//! Backfill command implementation - month-range loads

use anyhow::{Context, Result};
use log::warn;
use sl_core::{EntityDescriptor, MonthRange, SyncMode};
use sl_sync::PartitionedBackfill;

use crate::cli::{BackfillArgs, GlobalArgs};
use crate::commands::common::backfill_entities;
use crate::context::{fetch_mappings, RuntimeContext};

/// Execute the backfill command
pub(crate) async fn execute(args: &BackfillArgs, global: &GlobalArgs) -> Result<()> {
    let range = MonthRange::parse(&args.start, &args.end).context("Invalid month range")?;
    let ctx = RuntimeContext::load(global)?;
    let descriptors = partitioned(ctx.config.select_entities(&args.entities)?);
    if descriptors.is_empty() {
        println!("[INFO] No entities with a time field selected");
        return Ok(());
    }

    let source = ctx.remote_source()?;
    let db = RuntimeContext::open_store(&ctx.raw_store_path())?;
    let mappings = fetch_mappings(source.clone(), &ctx.config).await?;

    println!(
        "Backfilling {} entities, {} to {}\n",
        descriptors.len(),
        range.start(),
        range.end()
    );
    let engine = PartitionedBackfill::new(db, source, &ctx.config.remote);
    backfill_entities(&engine, &mappings, &descriptors, range)
        .await
        .finish()
}

/// Drop snapshot entities from an explicit selection
fn partitioned(descriptors: Vec<&EntityDescriptor>) -> Vec<&EntityDescriptor> {
    descriptors
        .into_iter()
        .filter(|d| {
            let keep = d.mode() == SyncMode::Partitioned;
            if !keep {
                warn!("{} has no time field; use `sluice snapshot`", d.entity);
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partitioned_filters_snapshot_entities() {
        let invoices = EntityDescriptor::new("AINVOICES", "stg_ainvoices").with_time_field("IVDATE");
        let customers = EntityDescriptor::new("CUSTOMERS", "stg_customers");
        let kept = partitioned(vec![&customers, &invoices]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].entity.as_str(), "AINVOICES");
    }
}
