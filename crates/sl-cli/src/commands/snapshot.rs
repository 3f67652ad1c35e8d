//! Snapshot command implementation - whole-table reloads

use anyhow::Result;
use log::warn;
use sl_core::SyncMode;
use sl_sync::SnapshotSync;

use crate::cli::{GlobalArgs, SnapshotArgs};
use crate::commands::common::snapshot_entities;
use crate::context::{fetch_mappings, RuntimeContext};

/// Execute the snapshot command
pub(crate) async fn execute(args: &SnapshotArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let descriptors: Vec<_> = ctx
        .config
        .select_entities(&args.entities)?
        .into_iter()
        .filter(|d| {
            let keep = d.mode() != SyncMode::Partitioned;
            if !keep {
                warn!("{} has a time field; use `sluice backfill`", d.entity);
            }
            keep
        })
        .collect();
    if descriptors.is_empty() {
        println!("[INFO] No snapshot entities selected");
        return Ok(());
    }

    let source = ctx.remote_source()?;
    let db = RuntimeContext::open_store(&ctx.raw_store_path())?;
    let mappings = fetch_mappings(source.clone(), &ctx.config).await?;

    println!("Loading {} snapshot tables\n", descriptors.len());
    let engine = SnapshotSync::new(db, source, &ctx.config.remote);
    snapshot_entities(&engine, &mappings, &descriptors)
        .await
        .finish()
}
