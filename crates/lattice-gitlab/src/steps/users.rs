//! User ingestion.
//!
//! Users enter the graph through group membership. The accumulator
//! deduplicates by key, so a user appearing in several groups is still a
//! single node. A failed membership fetch skips that group rather than
//! failing the stage; the linking stages tolerate an incomplete user
//! population.

use std::sync::Arc;

use async_trait::async_trait;
use lattice_graph::EntityType;
use lattice_pipeline::{Stage, StageContext, StageHandler};
use tracing::warn;

use super::ids;
use crate::convert::user_entity;
use crate::provider::{GitlabGroup, ResourceProvider};

struct FetchUsers {
    provider: Arc<dyn ResourceProvider>,
}

#[async_trait]
impl StageHandler for FetchUsers {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let groups = ctx.graph.entities_of_type(EntityType::Group);

        for group in groups {
            let Some(record) = ctx.raw.get(&group.key).cloned() else {
                warn!(key = %group.key, "raw data does not exist for group");
                continue;
            };
            let raw_group: GitlabGroup = serde_json::from_value(record)?;

            let members = match self.provider.fetch_group_members(raw_group.id).await {
                Ok(members) => members,
                Err(err) => {
                    warn!(group = raw_group.id, "skipping group, member fetch failed: {err}");
                    continue;
                }
            };

            for member in members {
                let record = serde_json::to_value(&member)?;
                ctx.add_entity_with_raw(user_entity(&member), record);
            }
        }
        Ok(())
    }
}

pub fn fetch_users_stage(provider: Arc<dyn ResourceProvider>) -> Stage {
    Stage::new(ids::USERS, "Fetch users", FetchUsers { provider })
        .produces_entities([EntityType::User])
        .depends_on([ids::GROUPS])
}
