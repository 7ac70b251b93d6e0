//! Pipeline error taxonomy.
//!
//! Configuration errors are detected by validation before any stage runs.
//! A stage handler error marks that stage `Failed` and surfaces at run
//! end as [`PipelineError::RunFailed`], carrying the full report so the
//! caller can see which stages completed, failed, or were skipped.

use crate::scheduler::RunReport;
use crate::stage::StageId;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("duplicate stage id `{0}`")]
    DuplicateStage(StageId),

    #[error("stage `{stage}` depends on unknown stage `{dependency}`")]
    UnknownDependency { stage: StageId, dependency: StageId },

    #[error("dependency cycle among stages: {}", join_ids(.0))]
    DependencyCycle(Vec<StageId>),

    #[error("pipeline run failed: {}", .report.failure_summary())]
    RunFailed { report: RunReport },

    #[error("flushing output of stage `{stage}` failed: {source}")]
    Flush {
        stage: StageId,
        #[source]
        source: anyhow::Error,
    },
}

fn join_ids(ids: &[StageId]) -> String {
    ids.iter()
        .map(StageId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
