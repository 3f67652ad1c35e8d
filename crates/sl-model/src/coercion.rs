//! Date coercion of freshly built model tables

use crate::error::{ModelError, ModelResult};
use log::{debug, info};
use sl_core::sql_utils::{quote_ident, string_literal, tolerant_date};
use sl_core::ColumnInfo;
use sl_db::Database;

/// Whether a column name ends in "date", ignoring case
pub fn is_date_named(name: &str) -> bool {
    name.to_lowercase().ends_with("date")
}

/// Date-named columns whose type is not already a date or timestamp
pub fn columns_to_coerce(columns: &[ColumnInfo]) -> Vec<&ColumnInfo> {
    columns
        .iter()
        .filter(|c| is_date_named(&c.name) && !c.is_temporal())
        .collect()
}

async fn is_base_table(db: &dyn Database, table: &str) -> ModelResult<bool> {
    let kind = db
        .query_one(&format!(
            "SELECT table_type FROM information_schema.tables \
             WHERE table_catalog = current_database() AND table_schema = 'main' \
             AND table_name = {}",
            string_literal(table)
        ))
        .await?;
    Ok(kind.as_deref() == Some("BASE TABLE"))
}

/// Convert every date-named, non-temporal column of `table` to DATE in
/// place. Values that do not parse become NULL. Views are left alone.
///
/// Returns the converted column names.
pub async fn coerce_date_columns(db: &dyn Database, table: &str) -> ModelResult<Vec<String>> {
    if !is_base_table(db, table).await? {
        debug!("{}: not a base table, skipping date coercion", table);
        return Ok(Vec::new());
    }

    let columns = db.table_columns(table).await?;
    let mut coerced = Vec::new();
    for column in columns_to_coerce(&columns) {
        let sql = format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE DATE USING {}",
            quote_ident(table),
            quote_ident(&column.name),
            tolerant_date(&column.name)
        );
        db.execute(&sql)
            .await
            .map_err(|source| ModelError::Execution {
                model: table.to_string(),
                source,
            })?;
        info!("{}.{}: {} -> DATE", table, column.name, column.data_type);
        coerced.push(column.name.clone());
    }
    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_db::DuckDbBackend;

    #[test]
    fn test_columns_to_coerce() {
        let columns = vec![
            ColumnInfo::new("IVDATE", "VARCHAR"),
            ColumnInfo::new("CURDate", "BIGINT"),
            ColumnInfo::new("BALDATE", "DATE"),
            ColumnInfo::new("UDATE", "TIMESTAMP WITH TIME ZONE"),
            ColumnInfo::new("DATES", "VARCHAR"),
            ColumnInfo::new("IVNUM", "VARCHAR"),
        ];
        let names: Vec<&str> = columns_to_coerce(&columns)
            .into_iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["IVDATE", "CURDate"]);
    }

    #[tokio::test]
    async fn test_coerce_text_dates_with_garbage() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE inv AS SELECT * FROM (VALUES \
             ('2024-05-02T00:00:00+02:00', 'a'), ('not a date', 'b'), (NULL, 'c')) t(IVDATE, IVNUM)",
        )
        .await
        .unwrap();

        let coerced = coerce_date_columns(&db, "inv").await.unwrap();
        assert_eq!(coerced, vec!["IVDATE"]);

        let columns = db.table_columns("inv").await.unwrap();
        assert_eq!(columns[0].data_type, "DATE");
        assert_eq!(
            db.query_one("SELECT IVDATE FROM inv WHERE IVNUM = 'a'")
                .await
                .unwrap()
                .as_deref(),
            Some("2024-05-02")
        );
        assert_eq!(
            db.query_count("SELECT * FROM inv WHERE IVDATE IS NULL").await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_views_are_not_coerced() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute("CREATE VIEW v AS SELECT '2024-01-01' AS DUEDATE")
            .await
            .unwrap();
        assert!(coerce_date_columns(&db, "v").await.unwrap().is_empty());
        assert_eq!(db.table_columns("v").await.unwrap()[0].data_type, "VARCHAR");
    }
}
