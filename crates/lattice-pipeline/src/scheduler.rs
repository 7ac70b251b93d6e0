//! Dependency-ordered stage execution.
//!
//! The scheduler validates the declared dependency graph before any
//! handler runs (duplicate ids, unknown dependencies, and cycles are
//! configuration errors), then executes stages strictly sequentially in
//! topological order. Sequential execution is the concurrency policy:
//! the accumulator sees at most one active stage at a time and needs no
//! internal synchronization. Among stages with no mutual dependency,
//! declaration order breaks ties, so execution order is deterministic.
//!
//! Failure policy: a failed stage blocks every stage that depends on it,
//! directly or transitively; those are marked `Skipped` and their
//! handlers never run. Stages with no path from the failed stage still
//! execute and flush. The run then surfaces as
//! [`PipelineError::RunFailed`] carrying the full report.

use std::collections::HashMap;

use lattice_graph::{Accumulator, RawRecordStore};
use tracing::{info, warn};

use crate::context::StageContext;
use crate::error::PipelineError;
use crate::flush::{FlushBatch, GraphSink};
use crate::stage::{Stage, StageId};

/// Lifecycle of one stage within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
    Pending,
    Running,
    Completed,
    Failed {
        message: String,
    },
    /// A dependency, direct or transitive, did not complete. The handler
    /// was never invoked.
    Skipped {
        blocked_on: StageId,
    },
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Completed,
    Failed,
}

/// Final state of every stage, in declaration order, plus flush totals.
#[derive(Debug)]
pub struct RunReport {
    pub result: RunResult,
    pub statuses: Vec<(StageId, StageStatus)>,
    pub entities_flushed: usize,
    pub relationships_flushed: usize,
}

impl RunReport {
    pub fn status(&self, id: &StageId) -> Option<&StageStatus> {
        self.statuses
            .iter()
            .find(|(stage_id, _)| stage_id == id)
            .map(|(_, status)| status)
    }

    pub fn is_failed(&self) -> bool {
        self.result == RunResult::Failed
    }

    pub fn failure_summary(&self) -> String {
        let failed: Vec<String> = self
            .statuses
            .iter()
            .filter_map(|(id, status)| match status {
                StageStatus::Failed { message } => Some(format!("`{}`: {}", id, message)),
                _ => None,
            })
            .collect();
        let skipped: Vec<&str> = self
            .statuses
            .iter()
            .filter_map(|(id, status)| match status {
                StageStatus::Skipped { .. } => Some(id.as_str()),
                _ => None,
            })
            .collect();

        let mut summary = failed.join("; ");
        if !skipped.is_empty() {
            summary.push_str(&format!("; skipped: {}", skipped.join(", ")));
        }
        summary
    }
}

/// A declared set of stages plus the scheduler that executes them.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stages(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn add_stage(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    /// Validate ids and the dependency DAG, returning the execution
    /// order without running anything.
    pub fn execution_order(&self) -> Result<Vec<StageId>, PipelineError> {
        Ok(self
            .topological_order()?
            .into_iter()
            .map(|idx| self.stages[idx].id.clone())
            .collect())
    }

    fn topological_order(&self) -> Result<Vec<usize>, PipelineError> {
        let mut index_of: HashMap<&StageId, usize> = HashMap::new();
        for (idx, stage) in self.stages.iter().enumerate() {
            if index_of.insert(&stage.id, idx).is_some() {
                return Err(PipelineError::DuplicateStage(stage.id.clone()));
            }
        }

        let mut indegree = vec![0usize; self.stages.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.stages.len()];
        for (idx, stage) in self.stages.iter().enumerate() {
            for dependency in &stage.depends_on {
                let &dep_idx =
                    index_of
                        .get(dependency)
                        .ok_or_else(|| PipelineError::UnknownDependency {
                            stage: stage.id.clone(),
                            dependency: dependency.clone(),
                        })?;
                indegree[idx] += 1;
                dependents[dep_idx].push(idx);
            }
        }

        let mut order = Vec::with_capacity(self.stages.len());
        let mut emitted = vec![false; self.stages.len()];
        while order.len() < self.stages.len() {
            // Lowest declaration index among ready stages runs next.
            let next = (0..self.stages.len()).find(|&idx| !emitted[idx] && indegree[idx] == 0);
            let Some(idx) = next else {
                let stuck = (0..self.stages.len())
                    .filter(|&idx| !emitted[idx])
                    .map(|idx| self.stages[idx].id.clone())
                    .collect();
                return Err(PipelineError::DependencyCycle(stuck));
            };
            emitted[idx] = true;
            order.push(idx);
            for &dependent in &dependents[idx] {
                indegree[dependent] -= 1;
            }
        }
        Ok(order)
    }

    /// Execute every stage exactly once, flushing each completed stage's
    /// output to `sink` before the next stage starts.
    pub async fn run(self, sink: &mut dyn GraphSink) -> Result<RunReport, PipelineError> {
        let order = self.topological_order()?;
        let index_of: HashMap<&StageId, usize> = self
            .stages
            .iter()
            .enumerate()
            .map(|(idx, stage)| (&stage.id, idx))
            .collect();

        let mut statuses: Vec<StageStatus> = vec![StageStatus::Pending; self.stages.len()];
        let mut graph = Accumulator::new();
        let mut raw = RawRecordStore::new();
        let mut entities_flushed = 0;
        let mut relationships_flushed = 0;
        let mut any_failed = false;

        for idx in order {
            let stage = &self.stages[idx];

            let blocked_on = stage
                .depends_on
                .iter()
                .find(|dep| !matches!(statuses[index_of[*dep]], StageStatus::Completed));
            if let Some(dependency) = blocked_on {
                warn!(stage = %stage.id, blocked_on = %dependency, "skipping stage, dependency did not complete");
                statuses[idx] = StageStatus::Skipped {
                    blocked_on: dependency.clone(),
                };
                continue;
            }

            statuses[idx] = StageStatus::Running;
            info!(stage = %stage.id, name = %stage.name, "stage started");
            let entity_mark = graph.entity_count();
            let relationship_mark = graph.relationship_count();

            let mut ctx = StageContext::new(&mut graph, &mut raw);
            match stage.handler.execute(&mut ctx).await {
                Ok(()) => {
                    let entities = graph.entities_from(entity_mark);
                    let relationships = graph.relationships_from(relationship_mark);
                    sink.flush(FlushBatch {
                        stage: &stage.id,
                        entities,
                        relationships,
                    })
                    .map_err(|source| PipelineError::Flush {
                        stage: stage.id.clone(),
                        source,
                    })?;
                    entities_flushed += entities.len();
                    relationships_flushed += relationships.len();
                    info!(
                        stage = %stage.id,
                        entities = entities.len(),
                        relationships = relationships.len(),
                        "stage completed"
                    );
                    statuses[idx] = StageStatus::Completed;
                }
                Err(err) => {
                    warn!(stage = %stage.id, "stage failed: {err:#}");
                    statuses[idx] = StageStatus::Failed {
                        message: format!("{err:#}"),
                    };
                    any_failed = true;
                }
            }
        }

        let report = RunReport {
            result: if any_failed {
                RunResult::Failed
            } else {
                RunResult::Completed
            },
            statuses: self
                .stages
                .iter()
                .zip(statuses)
                .map(|(stage, status)| (stage.id.clone(), status))
                .collect(),
            entities_flushed,
            relationships_flushed,
        };

        if any_failed {
            Err(PipelineError::RunFailed { report })
        } else {
            Ok(report)
        }
    }
}
