//! Group access roles.
//!
//! `fetch-group-access-roles` synthesizes one role entity per entry of a
//! project's `shared_with_groups` list, working entirely from raw
//! project records. Linking each role to the group it allows runs as a
//! separate stage so it can depend on the full group and user population
//! being ingested first; a shared group outside the configured account
//! legitimately has no node, and the link is then dropped.

use async_trait::async_trait;
use lattice_graph::{
    direct_relationship, entity_key, EntityType, Relationship, RelationshipClass, SourceKind,
};
use lattice_pipeline::{Stage, StageContext, StageHandler};
use tracing::{debug, warn};

use super::ids;
use crate::convert::group_access_role_entity;
use crate::provider::{GitlabGroupRef, GitlabProject};

struct FetchGroupAccessRoles;

#[async_trait]
impl StageHandler for FetchGroupAccessRoles {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let projects = ctx.graph.entities_of_type(EntityType::Project);

        for project in projects {
            let Some(record) = ctx.raw.get(&project.key).cloned() else {
                warn!(key = %project.key, "raw data does not exist for project");
                continue;
            };
            let raw_project: GitlabProject = serde_json::from_value(record)?;

            for share in &raw_project.shared_with_groups {
                let role = group_access_role_entity(raw_project.id, share);
                let edge = direct_relationship(
                    &project,
                    &role,
                    RelationshipClass::ProjectHasGroupAccessRole,
                );
                ctx.add_entity_with_raw(role, serde_json::to_value(share)?);
                ctx.graph.add_relationship(edge);
            }
        }
        Ok(())
    }
}

struct BuildGroupAccessRoleAllowsGroup;

#[async_trait]
impl StageHandler for BuildGroupAccessRoleAllowsGroup {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let roles = ctx.graph.entities_of_type(EntityType::GroupAccessRole);

        for role in roles {
            let Some(record) = ctx.raw.get(&role.key) else {
                warn!(key = %role.key, "raw data does not exist for group access role");
                continue;
            };
            let share: GitlabGroupRef = serde_json::from_value(record.clone())?;

            let group_key = entity_key(SourceKind::Group, share.group_id);
            if ctx.graph.find_entity(&group_key).is_none() {
                debug!(key = %role.key, group = share.group_id, "shared group not in graph, dropping link");
                continue;
            }
            ctx.graph.add_relationship(Relationship::new(
                role.key.clone(),
                group_key,
                RelationshipClass::GroupAccessRoleAllowsGroup,
            ));
        }
        Ok(())
    }
}

pub fn group_access_role_stages() -> Vec<Stage> {
    vec![
        Stage::new(
            ids::GROUP_ACCESS_ROLES,
            "Fetch group access roles",
            FetchGroupAccessRoles,
        )
        .produces_entities([EntityType::GroupAccessRole])
        .produces_relationships([RelationshipClass::ProjectHasGroupAccessRole])
        .depends_on([ids::PROJECTS]),
        Stage::new(
            ids::BUILD_GROUP_ACCESS_ROLE_ALLOWS_GROUP,
            "Build group access role allows group relationships",
            BuildGroupAccessRoleAllowsGroup,
        )
        .produces_relationships([RelationshipClass::GroupAccessRoleAllowsGroup])
        .depends_on([ids::GROUP_ACCESS_ROLES, ids::USERS]),
    ]
}
