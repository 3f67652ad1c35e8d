//! Metadata translation: description annotations -> field labels

use crate::client::RemoteSource;
use crate::error::{RemoteError, RemoteResult};
use log::{debug, info};
use sl_core::{FieldMapping, MetadataMapping};
use std::sync::Arc;

/// Parse a metadata document into per-entity field mappings.
///
/// Every `EntityType` element is considered regardless of namespace. For
/// each child `Property`, the first `Annotation` whose `Term` equals
/// `description_term` and carries a non-empty `String` is its description.
/// Entities with no described property are left out.
pub fn parse_metadata(xml: &str, description_term: &str) -> RemoteResult<MetadataMapping> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| RemoteError::Metadata(e.to_string()))?;

    let mut mapping = MetadataMapping::new();
    for entity in doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "EntityType")
    {
        let Some(entity_name) = entity.attribute("Name") else {
            continue;
        };

        let mut fields = FieldMapping::new();
        for property in entity
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == "Property")
        {
            let Some(field) = property.attribute("Name") else {
                continue;
            };
            let description = property
                .children()
                .filter(|n| {
                    n.is_element()
                        && n.tag_name().name() == "Annotation"
                        && n.attribute("Term") == Some(description_term)
                })
                .filter_map(|n| n.attribute("String"))
                .find(|s| !s.is_empty());

            if let Some(description) = description {
                fields.insert_described(field, description);
            }
        }

        if fields.is_empty() {
            debug!("no described fields for {}", entity_name);
        } else {
            mapping.insert(entity_name.to_string(), fields);
        }
    }

    Ok(mapping)
}

/// Fetches and parses the metadata document once per run
pub struct MetadataTranslator {
    source: Arc<dyn RemoteSource>,
    description_term: String,
}

impl MetadataTranslator {
    pub fn new(source: Arc<dyn RemoteSource>, description_term: impl Into<String>) -> Self {
        Self {
            source,
            description_term: description_term.into(),
        }
    }

    /// entity -> (field -> label)
    pub async fn fetch_metadata(&self) -> RemoteResult<MetadataMapping> {
        let xml = self.source.fetch_metadata().await?;
        let mapping = parse_metadata(&xml, &self.description_term)?;
        info!("metadata: {} entities with labels", mapping.len());
        Ok(mapping)
    }
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
