//! Lattice access-graph model
//!
//! This crate defines the data half of the ingestion engine:
//! - typed graph nodes ([`Entity`]) and edges ([`Relationship`]),
//! - the deterministic key resolver mapping raw source identifiers to
//!   stable graph identities ([`entity_key`]),
//! - the run-scoped, deduplicating [`Accumulator`], and
//! - the [`RawRecordStore`] holding the original source record each
//!   entity was synthesized from.
//!
//! Execution order and stage lifecycle live in `lattice-pipeline`; this
//! crate has no notion of stages, only of the state they share.

pub mod accumulator;
pub mod entity;
pub mod key;
pub mod raw;
pub mod relationship;

pub use accumulator::Accumulator;
pub use entity::{Entity, EntityType};
pub use key::{entity_key, EntityKey, SourceKind};
pub use raw::RawRecordStore;
pub use relationship::{direct_relationship, Relationship, RelationshipClass};
