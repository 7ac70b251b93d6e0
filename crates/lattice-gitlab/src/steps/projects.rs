//! Project ingestion.
//!
//! Walks every accumulated group and fetches its projects. A project's
//! full payload, including `shared_with_groups`, is attached as its raw
//! record; the group-access-role stage reads it back later.

use std::sync::Arc;

use async_trait::async_trait;
use lattice_graph::{direct_relationship, EntityType, RelationshipClass};
use lattice_pipeline::{Stage, StageContext, StageHandler};
use tracing::warn;

use super::ids;
use crate::convert::project_entity;
use crate::provider::{GitlabGroup, ResourceProvider};

struct FetchProjects {
    provider: Arc<dyn ResourceProvider>,
}

#[async_trait]
impl StageHandler for FetchProjects {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let groups = ctx.graph.entities_of_type(EntityType::Group);

        for group in groups {
            let Some(record) = ctx.raw.get(&group.key).cloned() else {
                warn!(key = %group.key, "raw data does not exist for group");
                continue;
            };
            let raw_group: GitlabGroup = serde_json::from_value(record)?;

            let projects = self.provider.fetch_group_projects(raw_group.id).await?;
            for project in projects {
                let entity = project_entity(&project);
                let edge =
                    direct_relationship(&group, &entity, RelationshipClass::GroupHasProject);
                ctx.add_entity_with_raw(entity, serde_json::to_value(&project)?);
                ctx.graph.add_relationship(edge);
            }
        }
        Ok(())
    }
}

pub fn fetch_projects_stage(provider: Arc<dyn ResourceProvider>) -> Stage {
    Stage::new(ids::PROJECTS, "Fetch projects", FetchProjects { provider })
        .produces_entities([EntityType::Project])
        .produces_relationships([RelationshipClass::GroupHasProject])
        .depends_on([ids::GROUPS])
}
