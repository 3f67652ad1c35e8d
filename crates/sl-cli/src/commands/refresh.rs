//! Refresh command implementation - snapshots plus the current month

use anyhow::Result;
use chrono::{Local, NaiveDate};
use sl_core::{Config, MetadataMapping, MonthRange, YearMonth};
use sl_db::Database;
use sl_remote::RemoteSource;
use sl_sync::{PartitionedBackfill, SnapshotSync};
use std::sync::Arc;

use crate::cli::GlobalArgs;
use crate::commands::common::{backfill_entities, snapshot_entities, Tally};
use crate::context::{fetch_mappings, RuntimeContext};

/// Execute the refresh command
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::load(global)?;
    let source = ctx.remote_source()?;
    let db = RuntimeContext::open_store(&ctx.raw_store_path())?;
    let mappings = fetch_mappings(source.clone(), &ctx.config).await?;

    refresh(db, source, &ctx.config, &mappings, Local::now().date_naive())
        .await
        .finish()
}

/// Snapshot every reference entity, then re-sync the month containing `today`
pub(crate) async fn refresh(
    db: Arc<dyn Database>,
    source: Arc<dyn RemoteSource>,
    config: &Config,
    mappings: &MetadataMapping,
    today: NaiveDate,
) -> Tally {
    let mut tally = Tally::default();

    let snapshots: Vec<_> = config.snapshot_entities().collect();
    if !snapshots.is_empty() {
        println!("Loading {} snapshot tables\n", snapshots.len());
        let engine = SnapshotSync::new(db.clone(), source.clone(), &config.remote);
        tally.add(snapshot_entities(&engine, mappings, &snapshots).await);
    }

    let partitioned: Vec<_> = config.partitioned_entities().collect();
    if !partitioned.is_empty() {
        let month = YearMonth::of(today);
        println!("\nRe-syncing {} for {} entities\n", month, partitioned.len());
        let engine = PartitionedBackfill::new(db, source, &config.remote);
        tally.add(
            backfill_entities(&engine, mappings, &partitioned, MonthRange::single(month)).await,
        );
    }

    tally
}
