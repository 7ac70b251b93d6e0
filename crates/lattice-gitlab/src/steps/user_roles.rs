//! User access roles.
//!
//! One role entity per membership, scoped to the group or project that
//! grants it. As with group roles, creating role entities and linking
//! them to user nodes are separate stages; the link half depends on
//! `fetch-users` so every resolvable user already has a node.

use std::sync::Arc;

use async_trait::async_trait;
use lattice_graph::{
    direct_relationship, entity_key, EntityType, Relationship, RelationshipClass, SourceKind,
};
use lattice_pipeline::{Stage, StageContext, StageHandler};
use tracing::{debug, warn};

use super::ids;
use crate::convert::user_access_role_entity;
use crate::provider::{GitlabGroup, GitlabProject, GitlabUserRef, ResourceProvider};

struct FetchUserAccessRoles {
    provider: Arc<dyn ResourceProvider>,
}

#[async_trait]
impl StageHandler for FetchUserAccessRoles {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        // Group memberships.
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

            let scope = format!("group:{}", raw_group.id);
            for member in members {
                let role = user_access_role_entity(&scope, &member);
                let edge = direct_relationship(
                    &group,
                    &role,
                    RelationshipClass::GroupHasUserAccessRole,
                );
                ctx.add_entity_with_raw(role, serde_json::to_value(&member)?);
                ctx.graph.add_relationship(edge);
            }
        }

        // Project memberships.
        let projects = ctx.graph.entities_of_type(EntityType::Project);
        for project in projects {
            let Some(record) = ctx.raw.get(&project.key).cloned() else {
                warn!(key = %project.key, "raw data does not exist for project");
                continue;
            };
            let raw_project: GitlabProject = serde_json::from_value(record)?;

            let members = match self.provider.fetch_project_members(raw_project.id).await {
                Ok(members) => members,
                Err(err) => {
                    warn!(project = raw_project.id, "skipping project, member fetch failed: {err}");
                    continue;
                }
            };

            let scope = format!("project:{}", raw_project.id);
            for member in members {
                let role = user_access_role_entity(&scope, &member);
                let edge = direct_relationship(
                    &project,
                    &role,
                    RelationshipClass::ProjectHasUserAccessRole,
                );
                ctx.add_entity_with_raw(role, serde_json::to_value(&member)?);
                ctx.graph.add_relationship(edge);
            }
        }
        Ok(())
    }
}

struct BuildUserAccessRoleAllowsUser;

#[async_trait]
impl StageHandler for BuildUserAccessRoleAllowsUser {
    async fn execute(&self, ctx: &mut StageContext<'_>) -> anyhow::Result<()> {
        let roles = ctx.graph.entities_of_type(EntityType::UserAccessRole);

        for role in roles {
            let Some(record) = ctx.raw.get(&role.key) else {
                warn!(key = %role.key, "raw data does not exist for user access role");
                continue;
            };
            let member: GitlabUserRef = serde_json::from_value(record.clone())?;

            let user_key = entity_key(SourceKind::User, member.id);
            if ctx.graph.find_entity(&user_key).is_none() {
                debug!(key = %role.key, user = member.id, "user not in graph, dropping link");
                continue;
            }
            ctx.graph.add_relationship(Relationship::new(
                role.key.clone(),
                user_key,
                RelationshipClass::UserAccessRoleAllowsUser,
            ));
        }
        Ok(())
    }
}

pub fn user_access_role_stages(provider: Arc<dyn ResourceProvider>) -> Vec<Stage> {
    vec![
        Stage::new(
            ids::USER_ACCESS_ROLES,
            "Fetch user access roles",
            FetchUserAccessRoles { provider },
        )
        .produces_entities([EntityType::UserAccessRole])
        .produces_relationships([
            RelationshipClass::GroupHasUserAccessRole,
            RelationshipClass::ProjectHasUserAccessRole,
        ])
        .depends_on([ids::PROJECTS, ids::GROUPS]),
        Stage::new(
            ids::BUILD_USER_ACCESS_ROLE_ALLOWS_USER,
            "Build user access role allows user relationships",
            BuildUserAccessRoleAllowsUser,
        )
        .produces_relationships([RelationshipClass::UserAccessRoleAllowsUser])
        .depends_on([ids::USER_ACCESS_ROLES, ids::USERS]),
    ]
}
