//! Graph nodes synthesized from raw source records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::key::EntityKey;

/// Closed set of node types produced by ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Group,
    Project,
    User,
    GroupAccessRole,
    UserAccessRole,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Group => "group",
            EntityType::Project => "project",
            EntityType::User => "user",
            EntityType::GroupAccessRole => "group-access-role",
            EntityType::UserAccessRole => "user-access-role",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed, uniquely keyed node in the access graph.
///
/// The raw source record an entity was derived from is not stored on the
/// entity itself; it lives in [`RawRecordStore`](crate::raw::RawRecordStore)
/// under the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_type: EntityType,
    pub key: EntityKey,
    pub name: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Entity {
    pub fn new(entity_type: EntityType, key: EntityKey, name: impl Into<String>) -> Self {
        Self {
            entity_type,
            key,
            name: name.into(),
            attributes: serde_json::Value::Null,
        }
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }
}
