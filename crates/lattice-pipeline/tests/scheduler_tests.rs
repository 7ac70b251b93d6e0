//! Scheduler behavior: ordering, failure propagation, configuration
//! validation, and per-stage flush.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use lattice_graph::{entity_key, Entity, EntityType, Relationship, RelationshipClass, SourceKind};
use lattice_pipeline::{
    MemorySink, Pipeline, PipelineError, RunResult, Stage, StageContext, StageHandler, StageId,
    StageStatus,
};

/// Appends its id to a shared log when executed.
struct Records {
    id: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl StageHandler for Records {
    async fn execute(&self, _ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        self.log.lock().unwrap().push(self.id.to_string());
        Ok(())
    }
}

/// Bumps a counter when executed, to prove a handler never ran.
struct Counts {
    invocations: Arc<AtomicUsize>,
}

#[async_trait]
impl StageHandler for Counts {
    async fn execute(&self, _ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct AlwaysFails;

#[async_trait]
impl StageHandler for AlwaysFails {
    async fn execute(&self, _ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        Err(anyhow!("provider exhausted retries"))
    }
}

/// Adds one group entity and one edge out of it.
struct AddsGroup {
    id: u64,
}

#[async_trait]
impl StageHandler for AddsGroup {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let key = entity_key(SourceKind::Group, self.id);
        ctx.graph.add_entity(Entity::new(
            EntityType::Group,
            key.clone(),
            format!("group-{}", self.id),
        ));
        ctx.graph.add_relationship(Relationship::new(
            key,
            entity_key(SourceKind::Project, 1),
            RelationshipClass::GroupHasProject,
        ));
        Ok(())
    }
}

fn recording_stage(id: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Stage {
    Stage::new(
        id,
        format!("Stage {}", id),
        Records {
            id,
            log: Arc::clone(log),
        },
    )
}

#[tokio::test]
async fn dependencies_complete_strictly_before_dependents_start() {
    let log = Arc::new(Mutex::new(Vec::new()));
    // Declared in reverse on purpose; the dependency edges must win.
    let pipeline = Pipeline::with_stages(vec![
        recording_stage("c", &log).depends_on(["b"]),
        recording_stage("b", &log).depends_on(["a"]),
        recording_stage("a", &log),
    ]);

    let mut sink = MemorySink::new();
    let report = pipeline.run(&mut sink).await.expect("run succeeds");

    assert_eq!(report.result, RunResult::Completed);
    assert_eq!(*log.lock().unwrap(), ["a", "b", "c"]);
}

#[tokio::test]
async fn declaration_order_breaks_ties_between_independent_stages() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::with_stages(vec![
        recording_stage("first", &log),
        recording_stage("second", &log),
        recording_stage("third", &log),
    ]);

    let mut sink = MemorySink::new();
    pipeline.run(&mut sink).await.expect("run succeeds");

    assert_eq!(*log.lock().unwrap(), ["first", "second", "third"]);
}

#[tokio::test]
async fn failure_blocks_transitive_dependents_but_not_independents() {
    let blocked = Arc::new(AtomicUsize::new(0));
    let independent = Arc::new(AtomicUsize::new(0));

    let pipeline = Pipeline::with_stages(vec![
        Stage::new("a", "Fails", AlwaysFails),
        Stage::new(
            "b",
            "Direct dependent",
            Counts {
                invocations: Arc::clone(&blocked),
            },
        )
        .depends_on(["a"]),
        Stage::new(
            "c",
            "Transitive dependent",
            Counts {
                invocations: Arc::clone(&blocked),
            },
        )
        .depends_on(["b"]),
        Stage::new(
            "d",
            "Independent",
            Counts {
                invocations: Arc::clone(&independent),
            },
        ),
    ]);

    let mut sink = MemorySink::new();
    let err = pipeline.run(&mut sink).await.expect_err("run fails");

    let PipelineError::RunFailed { report } = err else {
        panic!("expected RunFailed, got {err}");
    };
    assert_eq!(report.result, RunResult::Failed);
    assert_eq!(blocked.load(Ordering::SeqCst), 0);
    assert_eq!(independent.load(Ordering::SeqCst), 1);

    assert!(matches!(
        report.status(&"a".into()),
        Some(StageStatus::Failed { .. })
    ));
    assert!(matches!(
        report.status(&"b".into()),
        Some(StageStatus::Skipped { .. })
    ));
    assert!(matches!(
        report.status(&"c".into()),
        Some(StageStatus::Skipped { .. })
    ));
    assert!(matches!(
        report.status(&"d".into()),
        Some(StageStatus::Completed)
    ));
}

#[tokio::test]
async fn cycles_are_rejected_before_any_handler_runs() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::with_stages(vec![
        Stage::new(
            "a",
            "A",
            Counts {
                invocations: Arc::clone(&invocations),
            },
        )
        .depends_on(["b"]),
        Stage::new(
            "b",
            "B",
            Counts {
                invocations: Arc::clone(&invocations),
            },
        )
        .depends_on(["a"]),
    ]);

    let mut sink = MemorySink::new();
    let err = pipeline.run(&mut sink).await.expect_err("cycle rejected");

    assert!(matches!(err, PipelineError::DependencyCycle(_)));
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
    assert!(sink.flushed_stages.is_empty());
}

#[tokio::test]
async fn unknown_dependency_is_a_configuration_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline =
        Pipeline::with_stages(vec![recording_stage("a", &log).depends_on(["missing"])]);

    let err = pipeline.execution_order().expect_err("unknown dependency");
    assert!(matches!(err, PipelineError::UnknownDependency { .. }));
}

#[tokio::test]
async fn duplicate_stage_id_is_a_configuration_error() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::with_stages(vec![
        recording_stage("a", &log),
        recording_stage("a", &log),
    ]);

    let err = pipeline.execution_order().expect_err("duplicate id");
    assert!(matches!(err, PipelineError::DuplicateStage(_)));
}

#[tokio::test]
async fn completed_stage_output_survives_a_later_failure() {
    let pipeline = Pipeline::with_stages(vec![
        Stage::new("seed", "Adds a group", AddsGroup { id: 9 }),
        Stage::new("boom", "Fails afterwards", AlwaysFails).depends_on(["seed"]),
    ]);

    let mut sink = MemorySink::new();
    let err = pipeline.run(&mut sink).await.expect_err("run fails");
    assert!(matches!(err, PipelineError::RunFailed { .. }));

    // The seed stage flushed before the failure.
    assert_eq!(sink.flushed_stages, vec![StageId::from("seed")]);
    assert!(sink
        .find_entity(&entity_key(SourceKind::Group, 9))
        .is_some());
    assert_eq!(sink.relationships.len(), 1);
}

#[tokio::test]
async fn each_flush_batch_carries_only_that_stage_additions() {
    let pipeline = Pipeline::with_stages(vec![
        Stage::new("one", "First group", AddsGroup { id: 1 }),
        Stage::new("two", "Second group", AddsGroup { id: 2 }).depends_on(["one"]),
    ]);

    let mut sink = MemorySink::new();
    let report = pipeline.run(&mut sink).await.expect("run succeeds");

    assert_eq!(report.entities_flushed, 2);
    assert_eq!(report.relationships_flushed, 2);
    assert_eq!(
        sink.flushed_stages,
        vec![StageId::from("one"), StageId::from("two")]
    );
    assert_eq!(sink.entities.len(), 2);
}

#[tokio::test]
async fn execution_order_reports_the_plan_without_running() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = Pipeline::with_stages(vec![
        recording_stage("link", &log).depends_on(["create", "users"]),
        recording_stage("users", &log),
        recording_stage("create", &log),
    ]);

    let order = pipeline.execution_order().expect("valid dag");
    let ids: Vec<&str> = order.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, ["users", "create", "link"]);
    assert!(log.lock().unwrap().is_empty());
}
