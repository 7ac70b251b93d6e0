//! Stage descriptors: named units of pipeline work with declared outputs
//! and dependencies.

use std::fmt;

use async_trait::async_trait;
use lattice_graph::{EntityType, RelationshipClass};

use crate::context::StageContext;

/// Identifier of a stage, unique within one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The work a stage performs, executed exactly once per run.
///
/// Handlers read previously accumulated entities through the context,
/// optionally fetch more raw records from an external collaborator, and
/// append new entities and relationships. Returning an error marks the
/// stage `Failed` and blocks every dependent stage.
#[async_trait]
pub trait StageHandler: Send + Sync {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()>;
}

/// A declared unit of pipeline work.
///
/// Declared at process start, executed exactly once per run, discarded
/// after. `produced_entity_types` and `produced_relationship_classes`
/// document the stage's output contract; `depends_on` is what the
/// scheduler actually enforces.
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub produced_entity_types: Vec<EntityType>,
    pub produced_relationship_classes: Vec<RelationshipClass>,
    pub depends_on: Vec<StageId>,
    pub handler: Box<dyn StageHandler>,
}

impl Stage {
    pub fn new(
        id: impl Into<StageId>,
        name: impl Into<String>,
        handler: impl StageHandler + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            produced_entity_types: Vec::new(),
            produced_relationship_classes: Vec::new(),
            depends_on: Vec::new(),
            handler: Box::new(handler),
        }
    }

    pub fn produces_entities(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.produced_entity_types.extend(types);
        self
    }

    pub fn produces_relationships(
        mut self,
        classes: impl IntoIterator<Item = RelationshipClass>,
    ) -> Self {
        self.produced_relationship_classes.extend(classes);
        self
    }

    pub fn depends_on<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<StageId>,
    {
        self.depends_on.extend(ids.into_iter().map(Into::into));
        self
    }
}
