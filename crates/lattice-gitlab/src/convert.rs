//! Pure converters from raw GitLab payloads to graph entities.
//!
//! Access-role keys embed the resource scope (`project:<id>` or
//! `group:<id>`) plus the grantee id, so the same group or user holds a
//! distinct role entity per resource it can access.

use lattice_graph::{entity_key, Entity, EntityType, SourceKind};
use serde_json::json;

use crate::provider::{GitlabGroup, GitlabGroupRef, GitlabProject, GitlabUserRef};

/// GitLab numeric access levels, mapped to role names.
pub fn role_name(access_level: Option<u32>) -> &'static str {
    match access_level {
        Some(50) => "owner",
        Some(40) => "maintainer",
        Some(30) => "developer",
        Some(20) => "reporter",
        Some(10) => "guest",
        Some(5) => "minimal access",
        _ => "member",
    }
}

pub fn group_entity(group: &GitlabGroup) -> Entity {
    Entity::new(
        EntityType::Group,
        entity_key(SourceKind::Group, group.id),
        group.name.clone(),
    )
    .with_attributes(json!({
        "fullPath": group.full_path,
        "visibility": group.visibility,
    }))
}

pub fn project_entity(project: &GitlabProject) -> Entity {
    Entity::new(
        EntityType::Project,
        entity_key(SourceKind::Project, project.id),
        project.name.clone(),
    )
    .with_attributes(json!({
        "pathWithNamespace": project.path_with_namespace,
        "visibility": project.visibility,
    }))
}

pub fn user_entity(member: &GitlabUserRef) -> Entity {
    let name = member
        .name
        .clone()
        .or_else(|| member.username.clone())
        .unwrap_or_else(|| format!("user {}", member.id));

    Entity::new(
        EntityType::User,
        entity_key(SourceKind::User, member.id),
        name,
    )
    .with_attributes(json!({ "username": member.username }))
}

/// Access a project extends to an external group via `shared_with_groups`.
pub fn group_access_role_entity(project_id: u64, share: &GitlabGroupRef) -> Entity {
    let key = entity_key(
        SourceKind::GroupAccessRole,
        format!("project:{}:group:{}", project_id, share.group_id),
    );
    let name = format!(
        "{} access for group {}",
        role_name(share.group_access_level),
        share.group_id
    );

    Entity::new(EntityType::GroupAccessRole, key, name).with_attributes(json!({
        "projectId": project_id,
        "accessLevel": share.group_access_level,
        "role": role_name(share.group_access_level),
    }))
}

/// Access a group or project extends to a user. `scope` is
/// `group:<id>` or `project:<id>`.
pub fn user_access_role_entity(scope: &str, member: &GitlabUserRef) -> Entity {
    let key = entity_key(
        SourceKind::UserAccessRole,
        format!("{}:user:{}", scope, member.id),
    );
    let name = format!(
        "{} access for user {}",
        role_name(member.access_level),
        member.id
    );

    Entity::new(EntityType::UserAccessRole, key, name).with_attributes(json!({
        "scope": scope,
        "accessLevel": member.access_level,
        "role": role_name(member.access_level),
    }))
}
