//! Protected resources as seen by the engine. Application types implement
//! [`Resource`]; the engine never owns them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::taxonomy::ResourceType;

pub type Tags = BTreeMap<String, String>;

pub trait Resource {
    fn name(&self) -> &str;
    fn resource_type(&self) -> ResourceType;
    fn tags(&self) -> &Tags;
}

/// Plain value implementation for call sites without a domain type of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedResource {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub tags: Tags,
}

impl TaggedResource {
    pub fn new(name: impl Into<String>, resource_type: ResourceType) -> Self {
        Self { name: name.into(), resource_type, tags: Tags::new() }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

impl Resource for TaggedResource {
    fn name(&self) -> &str { &self.name }
    fn resource_type(&self) -> ResourceType { self.resource_type }
    fn tags(&self) -> &Tags { &self.tags }
}
