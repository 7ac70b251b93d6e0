//! Group ingestion.

use std::sync::Arc;

use async_trait::async_trait;
use lattice_graph::EntityType;
use lattice_pipeline::{Stage, StageContext, StageHandler};
use tracing::debug;

use super::ids;
use crate::convert::group_entity;
use crate::provider::ResourceProvider;

struct FetchGroups {
    provider: Arc<dyn ResourceProvider>,
}

#[async_trait]
impl StageHandler for FetchGroups {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let groups = self.provider.fetch_groups().await?;
        debug!(count = groups.len(), "fetched groups");

        for group in groups {
            let record = serde_json::to_value(&group)?;
            ctx.add_entity_with_raw(group_entity(&group), record);
        }
        Ok(())
    }
}

pub fn fetch_groups_stage(provider: Arc<dyn ResourceProvider>) -> Stage {
    Stage::new(ids::GROUPS, "Fetch groups", FetchGroups { provider })
        .produces_entities([EntityType::Group])
}
