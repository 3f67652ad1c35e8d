//! Entity request URLs

use sl_core::{EntityDescriptor, PartitionWindow};

/// One GET against an entity collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityQuery {
    pub entity: String,
    pub select: Vec<String>,
    pub top: usize,
    pub filter: Option<String>,
}

impl EntityQuery {
    pub fn new(entity: impl Into<String>, top: usize) -> Self {
        Self {
            entity: entity.into(),
            select: Vec::new(),
            top,
            filter: None,
        }
    }

    /// Query for a descriptor's entity and field selection
    pub fn for_entity(descriptor: &EntityDescriptor, top: usize) -> Self {
        Self::new(descriptor.entity.as_str(), top).with_select(descriptor.select.clone())
    }

    /// Restrict to one month of the descriptor's time field
    pub fn for_window(
        descriptor: &EntityDescriptor,
        time_field: &str,
        window: &PartitionWindow,
        tz_offset: &str,
        top: usize,
    ) -> Self {
        Self::for_entity(descriptor, top).with_filter(window.remote_filter(time_field, tz_offset))
    }

    pub fn with_select(mut self, select: Vec<String>) -> Self {
        self.select = select;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Full request URL: `$select` (omitted when empty), `$top`, then the
    /// percent-encoded `$filter`
    pub fn to_url(&self, base_url: &str) -> String {
        let mut parts = Vec::with_capacity(3);
        if !self.select.is_empty() {
            parts.push(format!("$select={}", self.select.join(",")));
        }
        parts.push(format!("$top={}", self.top));
        if let Some(filter) = &self.filter {
            parts.push(format!("$filter={}", urlencoding::encode(filter)));
        }
        format!(
            "{}/{}?{}",
            base_url.trim_end_matches('/'),
            self.entity,
            parts.join("&")
        )
    }
}
