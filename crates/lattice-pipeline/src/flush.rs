//! Per-stage flush of accumulated output.
//!
//! The scheduler flushes after every completed stage, not once at run
//! end. The flush granularity is therefore the stage: output of stages
//! that completed before a later failure has already reached the sink.

use lattice_graph::{Entity, Relationship};

use crate::stage::StageId;

/// Everything one completed stage added to the accumulator.
pub struct FlushBatch<'a> {
    pub stage: &'a StageId,
    pub entities: &'a [Entity],
    pub relationships: &'a [Relationship],
}

/// Destination for per-stage output.
pub trait GraphSink {
    fn flush(&mut self, batch: FlushBatch<'_>) -> anyhow::Result<()>;
}

/// Sink that keeps every flushed batch in memory.
///
/// Used by tests to observe exactly what survived, and usable as a
/// staging buffer ahead of a downstream graph store.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub flushed_stages: Vec<StageId>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_entity(&self, key: &lattice_graph::EntityKey) -> Option<&Entity> {
        self.entities.iter().find(|entity| &entity.key == key)
    }
}

impl GraphSink for MemorySink {
    fn flush(&mut self, batch: FlushBatch<'_>) -> anyhow::Result<()> {
        self.entities.extend_from_slice(batch.entities);
        self.relationships.extend_from_slice(batch.relationships);
        self.flushed_stages.push(batch.stage.clone());
        Ok(())
    }
}
