//! Field mappings: machine field name -> normalized human-readable label.
//!
//! A mapping is built once per run from the remote metadata document and is
//! read-only afterwards. Labels are unique within one entity; a repeated
//! label gets `_2`, `_3`, ... appended in the order fields are added, so the
//! result depends on document order and nothing else.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Mappings for every entity in a metadata document, keyed by entity name
pub type MetadataMapping = BTreeMap<String, FieldMapping>;

/// Normalize a description annotation into a column label.
///
/// Whitespace runs (including leading/trailing) collapse to a single `_`
/// separator and quote characters are dropped.
pub fn normalize_label(description: &str) -> String {
    description
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect()
}

/// Ordered, collision-free mapping for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<(String, String)>,
    by_field: HashMap<String, usize>,
    labels: HashSet<String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field from its raw description annotation.
    ///
    /// Returns the label actually assigned, or `None` when the description
    /// normalizes to nothing (the field then keeps its machine name).
    pub fn insert_described(&mut self, field: &str, description: &str) -> Option<&str> {
        let base = normalize_label(description);
        if base.is_empty() {
            return None;
        }

        // A field seen twice keeps its first label
        if let Some(&idx) = self.by_field.get(field) {
            return Some(self.entries[idx].1.as_str());
        }

        let mut label = base.clone();
        let mut suffix = 1;
        while self.labels.contains(&label) {
            suffix += 1;
            label = format!("{}_{}", base, suffix);
        }

        self.labels.insert(label.clone());
        self.by_field.insert(field.to_string(), self.entries.len());
        self.entries.push((field.to_string(), label));
        self.entries.last().map(|(_, l)| l.as_str())
    }

    /// Label for a field, if the metadata described it
    pub fn get(&self, field: &str) -> Option<&str> {
        self.by_field
            .get(field)
            .map(|&idx| self.entries[idx].1.as_str())
    }

    /// Label for a field, falling back to the machine name
    pub fn label_for<'a>(&'a self, field: &'a str) -> &'a str {
        self.get(field).unwrap_or(field)
    }

    /// Entries in insertion (document) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(f, l)| (f.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for FieldMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, label) in &self.entries {
            map.serialize_entry(field, label)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "mapping_test.rs"]
mod tests;
