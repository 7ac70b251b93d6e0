//! Raw source records, retrievable by the entity they were synthesized into.
//!
//! Stages that need to inspect an original payload (for example a
//! project's `shared_with_groups` list) read it back from here by entity
//! key. Retrieval of an absent key is not an error: the caller logs a
//! diagnostic and skips that item.

use std::collections::HashMap;

use crate::key::EntityKey;

#[derive(Debug, Default)]
pub struct RawRecordStore {
    records: HashMap<EntityKey, serde_json::Value>,
}

impl RawRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: EntityKey, record: serde_json::Value) {
        self.records.insert(key, record);
    }

    pub fn get(&self, key: &EntityKey) -> Option<&serde_json::Value> {
        self.records.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{entity_key, SourceKind};
    use serde_json::json;

    #[test]
    fn get_after_put_returns_the_record() {
        let mut store = RawRecordStore::new();
        let key = entity_key(SourceKind::Project, 1);
        store.put(key.clone(), json!({ "id": 1, "shared_with_groups": [] }));

        assert_eq!(store.get(&key).unwrap()["id"], 1);
    }

    #[test]
    fn absent_key_is_not_an_error() {
        let store = RawRecordStore::new();
        assert!(store.get(&entity_key(SourceKind::Project, 2)).is_none());
    }
}
