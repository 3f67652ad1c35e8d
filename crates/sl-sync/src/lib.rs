//! sl-sync - Sync engines for sluice
//!
//! Two load strategies write remote entities into the raw store:
//! [`PartitionedBackfill`] replaces one calendar month at a time on the
//! entity's time field, and [`SnapshotSync`] replaces a whole table from a
//! single (or split) fetch. Both write through [`TableWriter`], which stages
//! each frame before touching the target table.

pub mod backfill;
pub mod error;
pub mod snapshot;
pub mod writer;

pub use backfill::{BackfillReport, MonthOutcome, MonthStatus, PartitionedBackfill};
pub use error::{SyncError, SyncResult};
pub use snapshot::SnapshotSync;
pub use writer::TableWriter;

use sl_core::{EntityDescriptor, FieldMapping, MetadataMapping};

/// Field mapping a descriptor should be loaded with.
///
/// Descriptors with `translate: false` and entities the metadata does not
/// describe get an empty mapping, so every column keeps its machine name.
pub fn mapping_for(mappings: &MetadataMapping, descriptor: &EntityDescriptor) -> FieldMapping {
    if !descriptor.translate {
        return FieldMapping::new();
    }
    let found = mappings.get(descriptor.entity.as_str()).or_else(|| {
        mappings
            .iter()
            .find(|(name, _)| descriptor.entity.matches(name))
            .map(|(_, m)| m)
    });
    match found {
        Some(mapping) => mapping.clone(),
        None => {
            log::warn!(
                "no metadata labels for {}; loading with machine names",
                descriptor.entity
            );
            FieldMapping::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mappings() -> MetadataMapping {
        let mut fields = FieldMapping::new();
        fields.insert_described("CUSTNAME", "מספר לקוח");
        MetadataMapping::from([("CUSTOMERS".to_string(), fields)])
    }

    #[test]
    fn test_mapping_for_matches_case_insensitively() {
        let desc = EntityDescriptor::new("customers", "לקוחות");
        assert_eq!(mapping_for(&mappings(), &desc).get("CUSTNAME"), Some("מספר_לקוח"));
    }

    #[test]
    fn test_mapping_for_untranslated_is_empty() {
        let mut desc = EntityDescriptor::new("CUSTOMERS", "stg_customers");
        desc.translate = false;
        assert!(mapping_for(&mappings(), &desc).is_empty());
    }

    #[test]
    fn test_mapping_for_unknown_entity_is_empty() {
        let desc = EntityDescriptor::new("LOGPART", "stg_parts");
        assert!(mapping_for(&mappings(), &desc).is_empty());
    }
}
