//! Generated files on disk and schema snapshots of a store

use crate::error::{ModelError, ModelResult};
use crate::proposer::ModelFile;
use log::{debug, info};
use sl_core::{RawSchema, TableSchema};
use sl_db::Database;
use std::path::{Component, Path, PathBuf};

/// Remove the previous run's outputs: model definitions in `models_dir`,
/// the derived store file, and the hint file. Missing paths are fine.
pub fn reset_workspace(models_dir: &Path, derived_store: &Path, hint_file: &Path) -> ModelResult<usize> {
    let mut removed = 0;
    if models_dir.is_dir() {
        let entries = std::fs::read_dir(models_dir).map_err(|e| ModelError::io(models_dir, e))?;
        for path in entries.filter_map(|e| e.ok().map(|e| e.path())) {
            let generated = path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| matches!(e, "sql" | "yml"));
            if generated {
                std::fs::remove_file(&path).map_err(|e| ModelError::io(&path, e))?;
                removed += 1;
            }
        }
    }

    let wal = PathBuf::from(format!("{}.wal", derived_store.display()));
    for path in [derived_store, wal.as_path(), hint_file] {
        if path.is_file() {
            std::fs::remove_file(path).map_err(|e| ModelError::io(path, e))?;
            debug!("Removed {}", path.display());
            removed += 1;
        }
    }

    info!("Reset workspace: {} files removed", removed);
    Ok(removed)
}

/// Write proposed files under `models_dir`, creating directories as needed.
/// Returns the written paths in input order.
pub fn write_model_files(models_dir: &Path, files: &[ModelFile]) -> ModelResult<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let relative = Path::new(file.relative_path());
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(ModelError::UnsafePath(file.name.clone()));
        }
        let path = models_dir.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;
        }
        std::fs::write(&path, &file.content).map_err(|e| ModelError::io(&path, e))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Snapshot every table and view of the store's main schema
pub async fn extract_schema(db: &dyn Database) -> ModelResult<RawSchema> {
    let mut tables = Vec::new();
    for name in db.list_tables().await? {
        let columns = db.table_columns(&name).await?;
        tables.push(TableSchema::new(name, columns));
    }
    Ok(RawSchema::new(tables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_db::DuckDbBackend;

    #[test]
    fn test_reset_removes_generated_files_only() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        std::fs::create_dir(&models).unwrap();
        std::fs::write(models.join("dim_a.sql"), "select 1").unwrap();
        std::fs::write(models.join("dim_a.yml"), "version: 2").unwrap();
        std::fs::write(models.join("README.md"), "keep").unwrap();
        let store = dir.path().join("derived.duckdb");
        std::fs::write(&store, "").unwrap();
        let hints = dir.path().join("star_hint.txt");

        let removed = reset_workspace(&models, &store, &hints).unwrap();
        assert_eq!(removed, 3);
        assert!(models.join("README.md").exists());
        assert!(!store.exists());
    }

    #[test]
    fn test_reset_tolerates_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let removed = reset_workspace(
            &dir.path().join("models"),
            &dir.path().join("derived.duckdb"),
            &dir.path().join("hints.txt"),
        )
        .unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_write_strips_models_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");
        let written = write_model_files(
            &models,
            &[
                ModelFile::new("models/dim_a.sql", "select 1"),
                ModelFile::new("/marts/fact_sales.sql", "select 2"),
            ],
        )
        .unwrap();

        assert_eq!(written[0], models.join("dim_a.sql"));
        assert_eq!(written[1], models.join("marts").join("fact_sales.sql"));
        assert_eq!(std::fs::read_to_string(&written[1]).unwrap(), "select 2");
    }

    #[test]
    fn test_write_rejects_paths_outside_models_dir() {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("models");

        for name in ["../escape.sql", "models/a/../../../escape.sql", "/models/../escape.sql"] {
            let err = write_model_files(&models, &[ModelFile::new(name, "select 1")]).unwrap_err();
            assert!(matches!(err, ModelError::UnsafePath(_)), "{name}: {err}");
        }
        assert!(!dir.path().join("escape.sql").exists());
    }

    #[tokio::test]
    async fn test_extract_schema_lists_tables_with_columns() {
        let db = DuckDbBackend::in_memory().unwrap();
        db.execute_batch(
            "CREATE TABLE stg_b (ID BIGINT, NAME VARCHAR); CREATE VIEW stg_a AS SELECT 1 AS X",
        )
        .await
        .unwrap();

        let schema = extract_schema(&db).await.unwrap();
        let names: Vec<&str> = schema.table_names().collect();
        assert_eq!(names, vec!["stg_a", "stg_b"]);
        let b = schema.table("stg_b").unwrap();
        assert_eq!(b.columns[0].name, "ID");
        assert_eq!(b.columns[0].data_type, "BIGINT");
        assert_eq!(b.columns[1].name, "NAME");
    }
}
