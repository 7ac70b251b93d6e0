//! Lattice ingestion pipeline
//!
//! A pipeline is a set of declared [`Stage`]s executed exactly once each
//! by the [`Pipeline`] scheduler, in an order that respects every
//! `depends_on` edge. Stages share state only through the
//! [`Accumulator`](lattice_graph::Accumulator) and
//! [`RawRecordStore`](lattice_graph::RawRecordStore) handed to them in a
//! [`StageContext`]; the scheduler owns both for the lifetime of one run.
//!
//! After each completed stage, exactly that stage's additions are flushed
//! to a [`GraphSink`], so output of completed stages survives a later
//! stage's failure.

pub mod context;
pub mod error;
pub mod flush;
pub mod scheduler;
pub mod stage;

pub use context::StageContext;
pub use error::PipelineError;
pub use flush::{FlushBatch, GraphSink, MemorySink};
pub use scheduler::{Pipeline, RunReport, RunResult, StageStatus};
pub use stage::{Stage, StageHandler, StageId};
