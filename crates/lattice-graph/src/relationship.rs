//! Directed, typed edges between graph entities.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::key::EntityKey;

/// Closed set of edge classes produced by ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipClass {
    GroupHasProject,
    GroupHasUserAccessRole,
    ProjectHasUserAccessRole,
    ProjectHasGroupAccessRole,
    GroupAccessRoleAllowsGroup,
    UserAccessRoleAllowsUser,
}

impl RelationshipClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipClass::GroupHasProject => "GROUP_HAS_PROJECT",
            RelationshipClass::GroupHasUserAccessRole => "GROUP_HAS_USER_ACCESS_ROLE",
            RelationshipClass::ProjectHasUserAccessRole => "PROJECT_HAS_USER_ACCESS_ROLE",
            RelationshipClass::ProjectHasGroupAccessRole => "PROJECT_HAS_GROUP_ACCESS_ROLE",
            RelationshipClass::GroupAccessRoleAllowsGroup => "GROUP_ACCESS_ROLE_ALLOWS_GROUP",
            RelationshipClass::UserAccessRoleAllowsUser => "USER_ACCESS_ROLE_ALLOWS_USER",
        }
    }
}

impl fmt::Display for RelationshipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed, typed edge `(from, to, class)`.
///
/// Identity is the full triple: the accumulator treats an identical
/// triple as a no-op on re-insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub from_key: EntityKey,
    pub to_key: EntityKey,
    pub class: RelationshipClass,
}

impl Relationship {
    pub fn new(from_key: EntityKey, to_key: EntityKey, class: RelationshipClass) -> Self {
        Self {
            from_key,
            to_key,
            class,
        }
    }
}

/// Edge between two already-synthesized entities.
pub fn direct_relationship(from: &Entity, to: &Entity, class: RelationshipClass) -> Relationship {
    Relationship::new(from.key.clone(), to.key.clone(), class)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;
    use crate::key::{entity_key, SourceKind};

    #[test]
    fn direct_relationship_copies_keys() {
        let project = Entity::new(
            EntityType::Project,
            entity_key(SourceKind::Project, 1),
            "website",
        );
        let group = Entity::new(EntityType::Group, entity_key(SourceKind::Group, 9), "infra");

        let edge = direct_relationship(&project, &group, RelationshipClass::GroupHasProject);
        assert_eq!(edge.from_key, project.key);
        assert_eq!(edge.to_key, group.key);
        assert_eq!(edge.class.as_str(), "GROUP_HAS_PROJECT");
    }
}
