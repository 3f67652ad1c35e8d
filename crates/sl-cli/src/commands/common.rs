//! Shared utilities for CLI commands

use anyhow::Result;
use sl_core::{EntityDescriptor, MetadataMapping, MonthRange};
use sl_sync::{mapping_for, MonthStatus, PartitionedBackfill, SnapshotSync};
use std::fmt;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that destructors run and store files are closed.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing user-facing to print
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Units of work (months or tables) by outcome
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) ok: usize,
    pub(crate) skipped: usize,
    pub(crate) failed: usize,
}

impl Tally {
    pub(crate) fn add(&mut self, other: Tally) {
        self.ok += other.ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Print the completion marker on full success, otherwise exit 1
    pub(crate) fn finish(self) -> Result<()> {
        println!();
        println!(
            "Completed: {} loaded, {} skipped, {} failed",
            self.ok, self.skipped, self.failed
        );
        if self.failed > 0 {
            return Err(ExitCode(1).into());
        }
        println!("DONE");
        Ok(())
    }
}

/// Backfill every descriptor over `range`; failures are reported and counted
pub(crate) async fn backfill_entities(
    engine: &PartitionedBackfill,
    mappings: &MetadataMapping,
    descriptors: &[&EntityDescriptor],
    range: MonthRange,
) -> Tally {
    let mut tally = Tally::default();
    for descriptor in descriptors {
        let mapping = mapping_for(mappings, descriptor);
        match engine.sync_partition(descriptor, &mapping, range).await {
            Ok(report) => {
                for outcome in &report.months {
                    match &outcome.status {
                        MonthStatus::Loaded(n) => {
                            tally.ok += 1;
                            println!("[OK] {} {}: {} rows", report.table, outcome.month, n);
                        }
                        MonthStatus::Skipped => {
                            tally.skipped += 1;
                            println!("[INFO] {} {}: 0 rows (skipped)", report.table, outcome.month);
                        }
                        MonthStatus::Failed(e) => {
                            tally.failed += 1;
                            println!("[FAIL] {} {}: {}", report.table, outcome.month, e);
                        }
                    }
                }
            }
            Err(e) => {
                tally.failed += 1;
                println!("[FAIL] {}: {}", descriptor.entity, e);
            }
        }
    }
    tally
}

/// Snapshot every descriptor; failures are reported and counted
pub(crate) async fn snapshot_entities(
    engine: &SnapshotSync,
    mappings: &MetadataMapping,
    descriptors: &[&EntityDescriptor],
) -> Tally {
    let mut tally = Tally::default();
    for descriptor in descriptors {
        let mapping = mapping_for(mappings, descriptor);
        match engine.sync_snapshot(descriptor, &mapping).await {
            Ok(0) => {
                tally.skipped += 1;
                println!("[INFO] {}: 0 rows (table kept)", descriptor.table);
            }
            Ok(n) => {
                tally.ok += 1;
                println!("[OK] {}: {} rows", descriptor.table, n);
            }
            Err(e) => {
                tally.failed += 1;
                println!("[FAIL] {}: {}", descriptor.table, e);
            }
        }
    }
    tally
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
