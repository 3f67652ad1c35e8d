//! In-memory tabular frames built from remote record sets.

use crate::error::{CoreError, CoreResult};
use crate::mapping::FieldMapping;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Column-ordered rows of JSON cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

/// Store type inferred for a staged column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    BigInt,
    Double,
    Varchar,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::BigInt => "BIGINT",
            ColumnKind::Double => "DOUBLE",
            ColumnKind::Varchar => "VARCHAR",
        }
    }
}

impl Frame {
    /// Build a frame from rows already laid out in column order
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> CoreResult<Self> {
        if let Some(bad) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(CoreError::MalformedRecords {
                message: format!(
                    "row {} has {} cells, expected {}",
                    bad,
                    rows[bad].len(),
                    columns.len()
                ),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Build a frame from flat JSON records.
    ///
    /// Columns are the union of keys in first-encounter order; a record that
    /// lacks a key contributes null for that column.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for key in record.keys() {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|mut record| {
                columns
                    .iter()
                    .map(|c| record.remove(c).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Decode a `{"value": [...]}` response body
    pub fn from_value_document(doc: Value) -> CoreResult<Self> {
        let items = match doc {
            Value::Object(mut obj) => match obj.remove("value") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    return Err(CoreError::MalformedRecords {
                        message: format!("'value' is not an array: {}", type_name(&other)),
                    })
                }
            },
            other => {
                return Err(CoreError::MalformedRecords {
                    message: format!("expected an object, found {}", type_name(&other)),
                })
            }
        };

        let records = items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(map),
                other => Err(CoreError::MalformedRecords {
                    message: format!("record is not an object: {}", type_name(&other)),
                }),
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self::from_records(records))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rename columns through a field mapping.
    ///
    /// Unmapped columns keep their machine name and win over a label that
    /// would duplicate them; a losing column keeps its machine name too.
    pub fn rename(mut self, mapping: &FieldMapping) -> Self {
        let mut taken: HashSet<String> = self
            .columns
            .iter()
            .filter(|c| mapping.get(c).is_none())
            .cloned()
            .collect();
        let mut renamed = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let name = match mapping.get(column) {
                None => column.clone(),
                Some(label) if taken.contains(label) => {
                    log::warn!("label '{}' already used; keeping column '{}'", label, column);
                    column.clone()
                }
                Some(label) => label.to_string(),
            };
            taken.insert(name.clone());
            renamed.push(name);
        }
        self.columns = renamed;
        self
    }

    /// Append another frame, aligning by column name.
    ///
    /// Columns only one side has are null on the other. Rows are not
    /// deduplicated.
    pub fn concat(mut self, other: Frame) -> Self {
        let mut positions = Vec::with_capacity(other.columns.len());
        for column in &other.columns {
            match self.column_index(column) {
                Some(idx) => positions.push(idx),
                None => {
                    self.columns.push(column.clone());
                    for row in &mut self.rows {
                        row.push(Value::Null);
                    }
                    positions.push(self.columns.len() - 1);
                }
            }
        }

        let width = self.columns.len();
        for row in other.rows {
            let mut aligned = vec![Value::Null; width];
            for (cell, &pos) in row.into_iter().zip(&positions) {
                aligned[pos] = cell;
            }
            self.rows.push(aligned);
        }
        self
    }

    /// Infer the store type of every column
    pub fn column_kinds(&self) -> Vec<ColumnKind> {
        (0..self.columns.len())
            .map(|idx| infer_kind(self.rows.iter().map(|r| &r[idx])))
            .collect()
    }
}

fn infer_kind<'a>(cells: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for cell in cells {
        let cell_kind = match cell {
            Value::Null => continue,
            Value::Bool(_) => ColumnKind::Boolean,
            Value::Number(n) if n.is_i64() => ColumnKind::BigInt,
            Value::Number(_) => ColumnKind::Double,
            _ => return ColumnKind::Varchar,
        };
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::BigInt), ColumnKind::Double)
            | (Some(ColumnKind::Double), ColumnKind::BigInt) => ColumnKind::Double,
            _ => return ColumnKind::Varchar,
        });
    }
    kind.unwrap_or(ColumnKind::Varchar)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;
