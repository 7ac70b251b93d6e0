//! Append-only, deduplicating store of one run's entities and relationships.
//!
//! The accumulator is created by the scheduler at run start, handed to
//! every stage by reference, and discarded at run end. It owns all
//! synthesized entities and relationships for the duration of the run;
//! stages read through its query surface and write through its append
//! surface, never holding their own copies across executions.
//!
//! Mutation during iteration is ruled out by the borrow checker: stages
//! that append while walking a type take a snapshot via
//! [`Accumulator::entities_of_type`] first.

use std::collections::{HashMap, HashSet};

use crate::entity::{Entity, EntityType};
use crate::key::EntityKey;
use crate::relationship::{Relationship, RelationshipClass};

#[derive(Debug, Default)]
pub struct Accumulator {
    entities: Vec<Entity>,
    index: HashMap<EntityKey, usize>,
    relationships: Vec<Relationship>,
    seen_edges: HashSet<(EntityKey, EntityKey, RelationshipClass)>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity. A duplicate key merges into the existing node:
    /// the original insertion position is kept, the newer name and
    /// attributes win. There is never more than one node per key.
    pub fn add_entity(&mut self, entity: Entity) {
        match self.index.get(&entity.key) {
            Some(&slot) => {
                self.entities[slot].name = entity.name;
                self.entities[slot].attributes = entity.attributes;
            }
            None => {
                self.index.insert(entity.key.clone(), self.entities.len());
                self.entities.push(entity);
            }
        }
    }

    pub fn add_entities(&mut self, entities: Vec<Entity>) {
        for entity in entities {
            self.add_entity(entity);
        }
    }

    /// Append a relationship. An identical `(from, to, class)` triple is
    /// a no-op, so re-running a stage cannot duplicate edges.
    pub fn add_relationship(&mut self, relationship: Relationship) {
        let fingerprint = (
            relationship.from_key.clone(),
            relationship.to_key.clone(),
            relationship.class,
        );
        if self.seen_edges.insert(fingerprint) {
            self.relationships.push(relationship);
        }
    }

    pub fn add_relationships(&mut self, relationships: Vec<Relationship>) {
        for relationship in relationships {
            self.add_relationship(relationship);
        }
    }

    /// Lazy, restartable iteration over entities of one type, in
    /// insertion order. A fresh call restarts from the beginning.
    pub fn iter_entities(&self, entity_type: EntityType) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |entity| entity.entity_type == entity_type)
    }

    /// Snapshot of the entities of one type, for stages that append while
    /// walking the result.
    pub fn entities_of_type(&self, entity_type: EntityType) -> Vec<Entity> {
        self.iter_entities(entity_type).cloned().collect()
    }

    /// O(1) expected lookup by identity.
    pub fn find_entity(&self, key: &EntityKey) -> Option<&Entity> {
        self.index.get(key).map(|&slot| &self.entities[slot])
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// Entities appended at or after `watermark`. The scheduler records a
    /// watermark before each stage and flushes exactly that stage's
    /// additions afterwards.
    pub fn entities_from(&self, watermark: usize) -> &[Entity] {
        &self.entities[watermark.min(self.entities.len())..]
    }

    /// Relationships appended at or after `watermark`.
    pub fn relationships_from(&self, watermark: usize) -> &[Relationship] {
        &self.relationships[watermark.min(self.relationships.len())..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{entity_key, SourceKind};
    use serde_json::json;

    fn group(id: u64, name: &str) -> Entity {
        Entity::new(EntityType::Group, entity_key(SourceKind::Group, id), name)
    }

    #[test]
    fn add_entities_twice_is_idempotent() {
        let batch = vec![group(1, "infra"), group(2, "platform")];

        let mut once = Accumulator::new();
        once.add_entities(batch.clone());

        let mut twice = Accumulator::new();
        twice.add_entities(batch.clone());
        twice.add_entities(batch);

        assert_eq!(once.entities(), twice.entities());
        assert_eq!(twice.entity_count(), 2);
    }

    #[test]
    fn duplicate_key_merges_without_a_second_node() {
        let mut acc = Accumulator::new();
        acc.add_entity(group(1, "infra"));
        acc.add_entity(group(2, "platform"));
        acc.add_entity(
            group(1, "infrastructure").with_attributes(json!({ "visibility": "private" })),
        );

        assert_eq!(acc.entity_count(), 2);
        let merged = acc
            .find_entity(&entity_key(SourceKind::Group, 1))
            .expect("merged node");
        // Last write wins for the payload, the slot stays put.
        assert_eq!(merged.name, "infrastructure");
        assert_eq!(acc.entities()[0].key, merged.key);
    }

    #[test]
    fn identical_relationship_is_a_no_op() {
        let mut acc = Accumulator::new();
        let edge = Relationship::new(
            entity_key(SourceKind::Group, 1),
            entity_key(SourceKind::Project, 2),
            RelationshipClass::GroupHasProject,
        );
        acc.add_relationship(edge.clone());
        acc.add_relationship(edge);
        assert_eq!(acc.relationship_count(), 1);
    }

    #[test]
    fn iteration_is_insertion_ordered_and_restartable() {
        let mut acc = Accumulator::new();
        acc.add_entity(group(3, "c"));
        acc.add_entity(Entity::new(
            EntityType::Project,
            entity_key(SourceKind::Project, 7),
            "website",
        ));
        acc.add_entity(group(1, "a"));

        let names: Vec<_> = acc
            .iter_entities(EntityType::Group)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["c", "a"]);

        // Fresh call restarts from the beginning.
        let restarted: Vec<_> = acc
            .iter_entities(EntityType::Group)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, restarted);
    }

    #[test]
    fn watermark_slices_cover_only_new_additions() {
        let mut acc = Accumulator::new();
        acc.add_entity(group(1, "a"));
        let mark = acc.entity_count();
        acc.add_entity(group(2, "b"));
        acc.add_entity(group(1, "a-renamed")); // merge, not an addition

        let fresh = acc.entities_from(mark);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "b");
    }

    #[test]
    fn find_entity_misses_cleanly() {
        let acc = Accumulator::new();
        assert!(acc.find_entity(&entity_key(SourceKind::User, 404)).is_none());
    }
}
