//! Entity descriptors: which remote collection lands in which store table, and how.

use crate::names::{EntityName, TableName};
use serde::{Deserialize, Serialize};

/// One synchronized remote collection, as declared in `sluice.yml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDescriptor {
    /// Machine name of the remote collection
    pub entity: EntityName,

    /// Target table in the raw store (usually a human-readable label)
    pub table: TableName,

    /// Time field used to partition the backfill by month
    #[serde(default)]
    pub time_field: Option<String>,

    /// Fields to request via `$select`; empty means every field
    #[serde(default)]
    pub select: Vec<String>,

    /// Rename columns through the metadata field mapping
    #[serde(default = "default_translate")]
    pub translate: bool,

    /// Load in two complementary halves instead of one request
    #[serde(default)]
    pub split: Option<SplitSpec>,
}

/// Key-space split for an entity too large for a single page.
///
/// The halves are `field le 'boundary'` and `field gt 'boundary'`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitSpec {
    /// Field whose values partition the key space
    pub field: String,

    /// Highest value that belongs to the lower half
    pub boundary: String,
}

/// Load strategy implied by a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Month-by-month delete+insert on the time field
    Partitioned,
    /// Full replacement from one request
    Snapshot,
    /// Full replacement from two complementary requests
    SplitSnapshot,
}

fn default_translate() -> bool {
    true
}

impl EntityDescriptor {
    /// Create a snapshot descriptor with defaults for everything optional
    pub fn new(entity: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            entity: EntityName::new(entity),
            table: TableName::new(table),
            time_field: None,
            select: Vec::new(),
            translate: true,
            split: None,
        }
    }

    /// Builder-style setter for the partition time field
    pub fn with_time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field = Some(field.into());
        self
    }

    /// Builder-style setter for the split specification
    pub fn with_split(mut self, field: impl Into<String>, boundary: impl Into<String>) -> Self {
        self.split = Some(SplitSpec {
            field: field.into(),
            boundary: boundary.into(),
        });
        self
    }

    /// Builder-style setter for the `$select` list
    pub fn with_select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn mode(&self) -> SyncMode {
        match (&self.time_field, &self.split) {
            (Some(_), _) => SyncMode::Partitioned,
            (None, Some(_)) => SyncMode::SplitSnapshot,
            (None, None) => SyncMode::Snapshot,
        }
    }
}

impl SplitSpec {
    /// The two `$filter` predicates, lower half first.
    ///
    /// `le`/`gt` on the same boundary never overlap. Rows whose split field
    /// is null match neither half.
    pub fn predicates(&self) -> [String; 2] {
        let literal = self.boundary.replace('\'', "''");
        [
            format!("{} le '{}'", self.field, literal),
            format!("{} gt '{}'", self.field, literal),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode() {
        let snap = EntityDescriptor::new("CUSTOMERS", "stg_customers");
        assert_eq!(snap.mode(), SyncMode::Snapshot);

        let split = EntityDescriptor::new("LOGPART", "stg_parts").with_split("FAMILYNAME", "05");
        assert_eq!(split.mode(), SyncMode::SplitSnapshot);

        let part = EntityDescriptor::new("FNCLOG", "journal").with_time_field("BALDATE");
        assert_eq!(part.mode(), SyncMode::Partitioned);
    }

    #[test]
    fn test_split_predicates() {
        let spec = SplitSpec {
            field: "FAMILYNAME".to_string(),
            boundary: "05".to_string(),
        };
        let [lower, upper] = spec.predicates();
        assert_eq!(lower, "FAMILYNAME le '05'");
        assert_eq!(upper, "FAMILYNAME gt '05'");
    }

    #[test]
    fn test_split_predicates_escape_quotes() {
        let spec = SplitSpec {
            field: "NAME".to_string(),
            boundary: "O'B".to_string(),
        };
        assert_eq!(spec.predicates()[0], "NAME le 'O''B'");
    }

    #[test]
    fn test_deserialize_defaults() {
        let yaml = "entity: FNCLOG\ntable: journal\ntime_field: BALDATE\n";
        let desc: EntityDescriptor = serde_yaml::from_str(yaml).unwrap();
        assert!(desc.translate);
        assert!(desc.select.is_empty());
        assert_eq!(desc.time_field.as_deref(), Some("BALDATE"));
    }
}
