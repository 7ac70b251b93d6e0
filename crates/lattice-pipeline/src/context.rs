//! Execution context handed to each stage.

use lattice_graph::{Accumulator, Entity, RawRecordStore};

/// Borrowed view of one run's shared state.
///
/// The scheduler creates the accumulator and raw-record store at run
/// start and lends them to each stage in turn; no stage ever observes
/// state from before its dependencies completed, and there is no ambient
/// or global state to reach around this context.
pub struct StageContext<'run> {
    pub graph: &'run mut Accumulator,
    pub raw: &'run mut RawRecordStore,
}

impl<'run> StageContext<'run> {
    pub fn new(graph: &'run mut Accumulator, raw: &'run mut RawRecordStore) -> Self {
        Self { graph, raw }
    }

    /// Append an entity and attach the raw record it was derived from,
    /// under the same key.
    pub fn add_entity_with_raw(&mut self, entity: Entity, record: serde_json::Value) {
        self.raw.put(entity.key.clone(), record);
        self.graph.add_entity(entity);
    }
}
