//! Full-snapshot sync: whole-table replacement

use crate::error::SyncResult;
use crate::writer::TableWriter;
use log::{info, warn};
use sl_core::{EntityDescriptor, FieldMapping, Frame, RemoteConfig};
use sl_db::Database;
use sl_remote::{EntityQuery, RemoteSource};
use std::sync::Arc;

/// Replaces a table with everything the entity currently holds
pub struct SnapshotSync {
    source: Arc<dyn RemoteSource>,
    writer: TableWriter,
    page_size: usize,
}

impl SnapshotSync {
    pub fn new(db: Arc<dyn Database>, source: Arc<dyn RemoteSource>, remote: &RemoteConfig) -> Self {
        Self {
            source,
            writer: TableWriter::new(db),
            page_size: remote.page_size,
        }
    }

    /// Fetch the entity (in two halves when it has a split) and replace the
    /// target table, returning the row count.
    ///
    /// A fetch that returns no rows leaves the existing table untouched and
    /// reports 0.
    pub async fn sync_snapshot(
        &self,
        descriptor: &EntityDescriptor,
        mapping: &FieldMapping,
    ) -> SyncResult<usize> {
        let frame = self.fetch(descriptor).await?;
        if frame.is_empty() {
            warn!(
                "{}: snapshot returned no rows; keeping existing {}",
                descriptor.entity, descriptor.table
            );
            return Ok(0);
        }

        let frame = frame.rename(mapping);
        let n = self
            .writer
            .replace_all(descriptor.table.as_str(), &frame)
            .await?;
        info!("{}: {} rows (snapshot)", descriptor.table, n);
        Ok(n)
    }

    async fn fetch(&self, descriptor: &EntityDescriptor) -> SyncResult<Frame> {
        let base = EntityQuery::for_entity(descriptor, self.page_size);
        let Some(split) = &descriptor.split else {
            return Ok(self.source.fetch_rows(&base).await?);
        };

        let [lower, upper] = split.predicates();
        let first = self
            .source
            .fetch_rows(&base.clone().with_filter(lower))
            .await?;
        let second = self.source.fetch_rows(&base.with_filter(upper)).await?;
        info!(
            "{}: split load {} + {} rows",
            descriptor.entity,
            first.len(),
            second.len()
        );
        Ok(first.concat(second))
    }
}
