//! Staged writes into raw store tables

use crate::error::{SyncError, SyncResult};
use log::{debug, warn};
use sl_core::sql_utils::{quote_ident, tolerant_date};
use sl_core::{Frame, PartitionWindow};
use sl_db::Database;
use std::collections::HashSet;
use std::sync::Arc;

/// Scratch table every frame passes through before reaching its target
pub const STAGE_TABLE: &str = "__sluice_stage";

/// Empty copy of a target used to validate staged rows
const CHECK_TABLE: &str = "__sluice_check";

/// Writes frames into target tables through [`STAGE_TABLE`].
///
/// Each statement is its own implicit transaction. Staged rows are
/// validated against the target's column types before a window is
/// deleted, so only a crash between delete and insert can empty a window.
pub struct TableWriter {
    db: Arc<dyn Database>,
}

impl TableWriter {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Replace the rows of one partition window.
    ///
    /// Fails before touching the target when the frame lacks `time_column`.
    /// Creates the target from the staged schema on first write, widens it
    /// with any new columns, checks the staged rows cast cleanly, deletes rows whose `time_column` falls inside
    /// the window (unparseable values never match), then inserts by name.
    pub async fn replace_window(
        &self,
        table: &str,
        time_column: &str,
        window: &PartitionWindow,
        frame: &Frame,
    ) -> SyncResult<usize> {
        self.db.load_frame(STAGE_TABLE, frame).await?;
        let result = self.merge_window(table, time_column, window).await;
        self.db.drop_if_exists(STAGE_TABLE).await?;
        result.map(|()| frame.len())
    }

    /// Replace a table's entire contents with a frame
    pub async fn replace_all(&self, table: &str, frame: &Frame) -> SyncResult<usize> {
        self.db.load_frame(STAGE_TABLE, frame).await?;
        let result = self
            .db
            .create_table_as(
                table,
                &format!("SELECT * FROM {}", quote_ident(STAGE_TABLE)),
                true,
            )
            .await;
        self.db.drop_if_exists(STAGE_TABLE).await?;
        result?;
        Ok(frame.len())
    }

    async fn merge_window(
        &self,
        table: &str,
        time_column: &str,
        window: &PartitionWindow,
    ) -> SyncResult<()> {
        let target = quote_ident(table);
        let stage = quote_ident(STAGE_TABLE);

        let staged_time_column = self
            .db
            .table_columns(STAGE_TABLE)
            .await?
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(time_column));
        if !staged_time_column {
            return Err(SyncError::MissingTimeColumn {
                table: table.to_string(),
                column: time_column.to_string(),
            });
        }

        self.db
            .execute(&format!(
                "CREATE TABLE IF NOT EXISTS {} AS SELECT * FROM {} WHERE FALSE",
                target, stage
            ))
            .await?;

        self.widen(table).await?;
        self.check_insert(table).await?;

        let day = tolerant_date(time_column);
        let deleted = self
            .db
            .execute(&format!(
                "DELETE FROM {target} WHERE {day} >= DATE '{}' AND {day} < DATE '{}'",
                window.start().format("%Y-%m-%d"),
                window.end().format("%Y-%m-%d"),
            ))
            .await?;
        debug!("{}: deleted {} rows for {}", table, deleted, window.month());

        self.db
            .execute(&format!("INSERT INTO {} BY NAME SELECT * FROM {}", target, stage))
            .await?;
        Ok(())
    }

    /// Insert the staged rows into an empty copy of the target so a type
    /// conflict fails before the window is deleted
    async fn check_insert(&self, table: &str) -> SyncResult<()> {
        let check = quote_ident(CHECK_TABLE);
        self.db
            .execute(&format!(
                "CREATE OR REPLACE TEMP TABLE {} AS SELECT * FROM {} WHERE FALSE",
                check,
                quote_ident(table)
            ))
            .await?;
        let result = self
            .db
            .execute(&format!(
                "INSERT INTO {} BY NAME SELECT * FROM {}",
                check,
                quote_ident(STAGE_TABLE)
            ))
            .await;
        self.db.drop_if_exists(CHECK_TABLE).await?;
        result?;
        Ok(())
    }

    /// Add staged columns the target does not have yet; returns their names
    async fn widen(&self, table: &str) -> SyncResult<Vec<String>> {
        let existing: HashSet<String> = self
            .db
            .table_columns(table)
            .await?
            .into_iter()
            .map(|c| c.name.to_lowercase())
            .collect();

        let mut added = Vec::new();
        for column in self.db.table_columns(STAGE_TABLE).await? {
            if existing.contains(&column.name.to_lowercase()) {
                continue;
            }
            warn!(
                "{}: new column '{}' ({}) added to table",
                table, column.name, column.data_type
            );
            self.db
                .execute(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    quote_ident(table),
                    quote_ident(&column.name),
                    column.data_type
                ))
                .await?;
            added.push(column.name);
        }
        Ok(added)
    }
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod tests;
