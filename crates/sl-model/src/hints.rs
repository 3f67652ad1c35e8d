//! Heuristic fact-to-dimension join hints
//!
//! A fact column `<base>NAME` is considered joinable to a dimension table
//! that carries the same column, as long as the dimension also exposes
//! `<base>DES`. The inference runs over a schema snapshot only.

use crate::error::{ModelError, ModelResult};
use log::info;
use sl_core::RawSchema;
use std::fmt;
use std::path::Path;

/// One inferred relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinHint {
    pub fact_table: String,
    pub column: String,
    pub dimension: String,
    pub description_column: String,
}

impl fmt::Display for JoinHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} → {}.{} ({})",
            self.fact_table, self.column, self.dimension, self.column, self.description_column
        )
    }
}

/// Base of a column ending in "name" (any case), e.g. `AGENT` for `AGENTNAME`
fn name_base(column: &str) -> Option<&str> {
    let split = column.len().checked_sub(4)?;
    if !column.is_char_boundary(split) {
        return None;
    }
    let (base, suffix) = column.split_at(split);
    suffix.eq_ignore_ascii_case("name").then_some(base)
}

/// Infer hints from `fact` to every `dimension_prefix` table in schema order.
///
/// Fails with a schema mismatch when the fact table is not in the schema.
pub fn derive_join_hints(
    schema: &RawSchema,
    fact: &str,
    dimension_prefix: &str,
) -> ModelResult<Vec<JoinHint>> {
    let fact_table = schema
        .table(fact)
        .ok_or_else(|| ModelError::SchemaMismatch {
            model: fact.to_string(),
            missing: vec![fact.to_string()],
        })?;

    let mut hints = Vec::new();
    for dimension in schema.tables() {
        if dimension.name == fact_table.name || !dimension.name.starts_with(dimension_prefix) {
            continue;
        }
        for column in &dimension.columns {
            let Some(base) = name_base(&column.name) else {
                continue;
            };
            if !fact_table.has_column(&column.name) {
                continue;
            }
            let description_column = format!("{base}DES");
            if dimension.has_column(&description_column) {
                hints.push(JoinHint {
                    fact_table: fact_table.name.clone(),
                    column: column.name.clone(),
                    dimension: dimension.name.clone(),
                    description_column,
                });
            }
        }
    }
    Ok(hints)
}

/// Write one hint per line
pub fn write_hints(path: &Path, hints: &[JoinHint]) -> ModelResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ModelError::io(parent, e))?;
    }
    let text = hints
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n");
    std::fs::write(path, text).map_err(|e| ModelError::io(path, e))?;
    info!("Wrote {} join hints to {}", hints.len(), path.display());
    Ok(())
}

#[cfg(test)]
#[path = "hints_test.rs"]
mod tests;
