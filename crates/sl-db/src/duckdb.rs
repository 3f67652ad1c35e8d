//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params, params_from_iter, Connection};
use sl_core::sql_utils::{escape_sql_string, quote_ident};
use sl_core::{ColumnInfo, ColumnKind, Frame};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// DuckDB database backend
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::Open {
                target: ":memory:".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Open {
                target: parent.display().to_string(),
                message: e.to_string(),
            })?;
        }
        let conn = Connection::open(path)
            .map_err(|e| DbError::Open {
                target: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DbError::Poisoned)
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        log::debug!("{}", sql);
        conn.execute(sql, []).map_err(|e| DbError::from(e).with_statement(sql))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        log::debug!("{}", sql);
        conn.execute_batch(sql).map_err(|e| DbError::from(e).with_statement(sql))
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }

    fn query_one_sync(&self, sql: &str) -> DbResult<Option<String>> {
        let conn = self.lock()?;
        let wrapped = format!(
            "SELECT CAST(COLUMNS(*) AS VARCHAR) FROM ({}) AS q LIMIT 1",
            sql
        );
        match conn.query_row(&wrapped, [], |row| row.get::<_, Option<String>>(0)) {
            Ok(value) => Ok(value),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check if relation exists synchronously
    fn relation_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables \
             WHERE table_catalog = current_database() AND table_schema = 'main' AND table_name = ?",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn table_columns_sync(&self, name: &str) -> DbResult<Vec<ColumnInfo>> {
        let conn = self.lock()?;
        let sql = format!(
            "SELECT name, \"type\" FROM pragma_table_info('{}') ORDER BY cid",
            escape_sql_string(name)
        );
        let mut stmt = conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn list_tables_sync(&self) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_catalog = current_database() AND table_schema = 'main' \
             ORDER BY table_name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Stage a frame: typed CREATE OR REPLACE, then one prepared INSERT per row
    fn load_frame_sync(&self, table: &str, frame: &Frame) -> DbResult<usize> {
        let load_err = |message: String| DbError::Stage {
            table: table.to_string(),
            message,
        };
        if frame.columns().is_empty() {
            return Err(load_err("frame has no columns".to_string()));
        }

        let kinds = frame.column_kinds();
        let ddl = frame
            .columns()
            .iter()
            .zip(&kinds)
            .map(|(name, kind)| format!("{} {}", quote_ident(name), kind.sql_type()))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; kinds.len()].join(", ");

        let mut conn = self.lock()?;
        conn.execute(
            &format!("CREATE OR REPLACE TABLE {} ({})", quote_ident(table), ddl),
            [],
        )
        .map_err(|e| load_err(e.to_string()))?;

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(table),
                placeholders
            ))?;
            for row in frame.rows() {
                let values = row
                    .iter()
                    .zip(&kinds)
                    .map(|(cell, kind)| to_store_value(cell, *kind));
                stmt.execute(params_from_iter(values))
                    .map_err(|e| load_err(e.to_string()))?;
            }
        }
        tx.commit()?;
        Ok(frame.len())
    }
}

/// Convert a JSON cell to the store value for its inferred column kind
fn to_store_value(cell: &serde_json::Value, kind: ColumnKind) -> Value {
    use serde_json::Value as Json;
    match (cell, kind) {
        (Json::Null, _) => Value::Null,
        (Json::Bool(b), ColumnKind::Boolean) => Value::Boolean(*b),
        (Json::Number(n), ColumnKind::BigInt) => n.as_i64().map_or(Value::Null, Value::BigInt),
        (Json::Number(n), ColumnKind::Double) => n.as_f64().map_or(Value::Null, Value::Double),
        (Json::String(s), _) => Value::Text(s.clone()),
        (other, _) => Value::Text(other.to_string()),
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn create_table_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()> {
        let sql = if replace {
            format!("CREATE OR REPLACE TABLE {} AS {}", quote_ident(name), select)
        } else {
            format!("CREATE TABLE {} AS {}", quote_ident(name), select)
        };
        self.execute_sync(&sql)?;
        Ok(())
    }

    async fn create_view_as(&self, name: &str, select: &str, replace: bool) -> DbResult<()> {
        let sql = if replace {
            format!("CREATE OR REPLACE VIEW {} AS {}", quote_ident(name), select)
        } else {
            format!("CREATE VIEW {} AS {}", quote_ident(name), select)
        };
        self.execute_sync(&sql)?;
        Ok(())
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.relation_exists_sync(name)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn query_one(&self, sql: &str) -> DbResult<Option<String>> {
        self.query_one_sync(sql)
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        // The relation may be either kind; dropping the wrong kind errors
        let _ = self.execute_sync(&format!("DROP VIEW IF EXISTS {}", quote_ident(name)));
        let _ = self.execute_sync(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)));
        Ok(())
    }

    async fn table_columns(&self, name: &str) -> DbResult<Vec<ColumnInfo>> {
        self.table_columns_sync(name)
    }

    async fn list_tables(&self) -> DbResult<Vec<String>> {
        self.list_tables_sync()
    }

    async fn load_frame(&self, table: &str, frame: &Frame) -> DbResult<usize> {
        self.load_frame_sync(table, frame)
    }

    async fn attach_read_only(&self, path: &str, alias: &str) -> DbResult<()> {
        let sql = format!(
            "DETACH DATABASE IF EXISTS {alias}; ATTACH '{}' AS {alias} (READ_ONLY);",
            escape_sql_string(path),
            alias = quote_ident(alias)
        );
        self.execute_batch_sync(&sql)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
