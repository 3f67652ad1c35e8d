//! Partitioned backfill: month-by-month window replacement

use crate::error::{SyncError, SyncResult};
use crate::writer::TableWriter;
use log::{info, warn};
use sl_core::{EntityDescriptor, FieldMapping, MonthRange, PartitionWindow, RemoteConfig, YearMonth};
use sl_db::Database;
use sl_remote::{EntityQuery, RemoteSource};
use std::sync::Arc;

/// What happened to one month
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthStatus {
    /// Window replaced with this many rows
    Loaded(usize),
    /// The remote returned no rows; existing data was left untouched
    Skipped,
    /// Fetch or write failed; later months still ran
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthOutcome {
    pub month: YearMonth,
    pub status: MonthStatus,
}

/// Per-month results of one entity's backfill, in chronological order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackfillReport {
    pub entity: String,
    pub table: String,
    pub months: Vec<MonthOutcome>,
}

impl BackfillReport {
    pub fn rows_loaded(&self) -> usize {
        self.months
            .iter()
            .map(|m| match m.status {
                MonthStatus::Loaded(n) => n,
                _ => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MonthOutcome> {
        self.months
            .iter()
            .filter(|m| matches!(m.status, MonthStatus::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// Loads time-partitioned entities one calendar month at a time
pub struct PartitionedBackfill {
    source: Arc<dyn RemoteSource>,
    writer: TableWriter,
    page_size: usize,
    timezone_offset: String,
}

impl PartitionedBackfill {
    pub fn new(db: Arc<dyn Database>, source: Arc<dyn RemoteSource>, remote: &RemoteConfig) -> Self {
        Self {
            source,
            writer: TableWriter::new(db),
            page_size: remote.page_size,
            timezone_offset: remote.timezone_offset.clone(),
        }
    }

    /// Sync every month of `range` in order.
    ///
    /// A month that fails is recorded and the next month still runs; only a
    /// descriptor without a time field is an error for the whole call.
    pub async fn sync_partition(
        &self,
        descriptor: &EntityDescriptor,
        mapping: &FieldMapping,
        range: MonthRange,
    ) -> SyncResult<BackfillReport> {
        let time_field = descriptor
            .time_field
            .as_deref()
            .ok_or_else(|| SyncError::NotPartitioned {
                entity: descriptor.entity.to_string(),
            })?;

        let mut months = Vec::new();
        for window in range.windows() {
            let status = match self
                .sync_month(descriptor, time_field, mapping, &window)
                .await
            {
                Ok(0) => {
                    info!("{} {}: 0 rows (skipped)", descriptor.entity, window.month());
                    MonthStatus::Skipped
                }
                Ok(n) => {
                    info!("{} {}: {} rows", descriptor.table, window.month(), n);
                    MonthStatus::Loaded(n)
                }
                Err(e) => {
                    warn!("{} {}: {}", descriptor.entity, window.month(), e);
                    MonthStatus::Failed(e.to_string())
                }
            };
            months.push(MonthOutcome {
                month: window.month(),
                status,
            });
        }

        Ok(BackfillReport {
            entity: descriptor.entity.to_string(),
            table: descriptor.table.to_string(),
            months,
        })
    }

    async fn sync_month(
        &self,
        descriptor: &EntityDescriptor,
        time_field: &str,
        mapping: &FieldMapping,
        window: &PartitionWindow,
    ) -> SyncResult<usize> {
        let query = EntityQuery::for_window(
            descriptor,
            time_field,
            window,
            &self.timezone_offset,
            self.page_size,
        );
        let frame = self.source.fetch_rows(&query).await?;
        if frame.is_empty() {
            return Ok(0);
        }

        // Read the renamed time column by position: a label that lost a
        // collision leaves the field under its machine name
        let time_index = frame.column_index(time_field);
        let frame = frame.rename(mapping);
        let time_column = time_index
            .and_then(|idx| frame.columns().get(idx))
            .map_or_else(|| time_field.to_string(), String::clone);

        self.writer
            .replace_window(descriptor.table.as_str(), &time_column, window, &frame)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sl_core::Frame;
    use sl_db::DuckDbBackend;
    use sl_remote::MemorySource;

    fn remote() -> RemoteConfig {
        serde_json::from_value(json!({ "url": "https://erp.example.com/odata" })).unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_descriptor_is_rejected() {
        let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let engine = PartitionedBackfill::new(db, Arc::new(MemorySource::new()), &remote());
        let desc = EntityDescriptor::new("CUSTOMERS", "stg_customers");
        let range = MonthRange::parse("2023-01", "2023-01").unwrap();

        let err = engine
            .sync_partition(&desc, &FieldMapping::new(), range)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NotPartitioned { .. }));
    }

    #[tokio::test]
    async fn test_requests_carry_select_top_and_window() {
        let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let source = Arc::new(MemorySource::new());
        let engine = PartitionedBackfill::new(db, source.clone(), &remote());
        let desc = EntityDescriptor::new("SALESINVOICEITEMS", "stg_salesinvoiceitems")
            .with_time_field("IVDATE")
            .with_select(["IVNUM", "IVDATE"]);
        let range = MonthRange::parse("2023-11", "2024-01").unwrap();

        let report = engine
            .sync_partition(&desc, &FieldMapping::new(), range)
            .await
            .unwrap();

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].select, vec!["IVNUM", "IVDATE"]);
        assert_eq!(requests[0].top, 100_000);
        assert_eq!(
            requests[2].filter.as_deref(),
            Some("(IVDATE ge 2024-01-01T00:00:00+02:00 and IVDATE lt 2024-02-01T00:00:00+02:00)")
        );
        assert!(report
            .months
            .iter()
            .all(|m| m.status == MonthStatus::Skipped));
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_rerun_converges_when_time_label_collides() {
        let db: Arc<dyn Database> = Arc::new(DuckDbBackend::in_memory().unwrap());
        let source = Arc::new(MemorySource::new());
        let config = remote();
        let jan = YearMonth::new(2023, 1)
            .unwrap()
            .window()
            .remote_filter("IVDATE", &config.timezone_offset);
        source.set_rows(
            "AINVOICES",
            Some(&jan),
            Frame::new(
                vec!["IVDATE".into(), "DUEDATE".into(), "N".into()],
                vec![vec![
                    json!("2023-01-05T00:00:00+02:00"),
                    json!("2023-03-01T00:00:00+02:00"),
                    json!(1),
                ]],
            )
            .unwrap(),
        );
        let mut mapping = FieldMapping::new();
        mapping.insert_described("IVDATE", "DUEDATE");

        let desc = EntityDescriptor::new("AINVOICES", "stg_ainvoices").with_time_field("IVDATE");
        let engine = PartitionedBackfill::new(db.clone(), source, &config);
        let range = MonthRange::parse("2023-01", "2023-01").unwrap();
        for _ in 0..2 {
            let report = engine.sync_partition(&desc, &mapping, range).await.unwrap();
            assert!(report.is_success(), "{:?}", report.months);
        }

        assert_eq!(db.query_count("SELECT * FROM stg_ainvoices").await.unwrap(), 1);
    }

    #[test]
    fn test_report_totals() {
        let month = |m, status| MonthOutcome {
            month: YearMonth::new(2023, m).unwrap(),
            status,
        };
        let report = BackfillReport {
            entity: "E".into(),
            table: "T".into(),
            months: vec![
                month(1, MonthStatus::Loaded(10)),
                month(2, MonthStatus::Skipped),
                month(3, MonthStatus::Failed("boom".into())),
                month(4, MonthStatus::Loaded(5)),
            ],
        };
        assert_eq!(report.rows_loaded(), 15);
        assert_eq!(report.failures().count(), 1);
        assert!(!report.is_success());
    }
}
