//! Column alias table: a best-effort index of code and description columns

use crate::error::ModelResult;
use log::info;
use serde::Serialize;
use sl_core::sql_utils::string_literal;
use sl_core::{AliasLabels, ColumnInfo};
use sl_db::Database;

/// Table rebuilt on every run
pub const ALIAS_TABLE: &str = "column_aliases";

/// One `(alias, description)` row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub alias: String,
    pub description: String,
}

impl AliasEntry {
    pub fn new(alias: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            description: description.into(),
        }
    }
}

/// Alias entries for one model's columns.
///
/// A column ending in "des" is labelled a description of the model; one
/// ending in "name" a code. Both suffixes ignore case.
pub fn derive_aliases(model: &str, columns: &[ColumnInfo], labels: &AliasLabels) -> Vec<AliasEntry> {
    columns
        .iter()
        .filter_map(|c| {
            let lower = c.name.to_lowercase();
            let label = if lower.ends_with("des") {
                &labels.description
            } else if lower.ends_with("name") {
                &labels.code
            } else {
                return None;
            };
            Some(AliasEntry::new(&c.name, format!("{label} {model}")))
        })
        .collect()
}

/// Replace the alias table with `entries`; nothing is written when empty
pub async fn write_alias_table(db: &dyn Database, entries: &[AliasEntry]) -> ModelResult<()> {
    if entries.is_empty() {
        info!("No alias entries; {} not rebuilt", ALIAS_TABLE);
        return Ok(());
    }

    let rows = entries
        .iter()
        .map(|e| format!("({}, {})", string_literal(&e.alias), string_literal(&e.description)))
        .collect::<Vec<_>>()
        .join(",\n    ");
    db.create_table_as(
        ALIAS_TABLE,
        &format!("SELECT * FROM (VALUES\n    {rows}\n) AS t(alias, description)"),
        true,
    )
    .await?;
    info!("{}: {} entries", ALIAS_TABLE, entries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_db::DuckDbBackend;

    fn labels() -> AliasLabels {
        AliasLabels {
            description: "תיאור".into(),
            code: "קוד".into(),
        }
    }

    #[test]
    fn test_derive_by_suffix() {
        let columns = vec![
            ColumnInfo::new("AGENTNAME", "VARCHAR"),
            ColumnInfo::new("AGENTDES", "VARCHAR"),
            ColumnInfo::new("custname", "VARCHAR"),
            ColumnInfo::new("IVDATE", "DATE"),
        ];
        assert_eq!(
            derive_aliases("dim_agents", &columns, &labels()),
            vec![
                AliasEntry::new("AGENTNAME", "קוד dim_agents"),
                AliasEntry::new("AGENTDES", "תיאור dim_agents"),
                AliasEntry::new("custname", "קוד dim_agents"),
            ]
        );
    }

    #[tokio::test]
    async fn test_write_rebuilds_table() {
        let db = DuckDbBackend::in_memory().unwrap();
        write_alias_table(&db, &[AliasEntry::new("A'NAME", "קוד x"), AliasEntry::new("BDES", "d")])
            .await
            .unwrap();
        write_alias_table(&db, &[AliasEntry::new("CNAME", "קוד y")])
            .await
            .unwrap();

        assert_eq!(db.query_count("SELECT * FROM column_aliases").await.unwrap(), 1);
        assert_eq!(
            db.query_one("SELECT description FROM column_aliases WHERE alias = 'CNAME'")
                .await
                .unwrap()
                .as_deref(),
            Some("קוד y")
        );
    }

    #[tokio::test]
    async fn test_empty_entries_skip_table() {
        let db = DuckDbBackend::in_memory().unwrap();
        write_alias_table(&db, &[]).await.unwrap();
        assert!(!db.relation_exists(ALIAS_TABLE).await.unwrap());
    }
}
