//! Declared ingestion stages for the GitLab access graph.
//!
//! Create/link pairs (group access roles, user access roles) are split
//! into separate stages on purpose: the linking half declares a
//! dependency on the stages that ingest its link targets, so the
//! scheduler guarantees every resolvable target already exists before a
//! single link is attempted.

mod group_roles;
mod groups;
mod projects;
mod user_roles;
mod users;

pub use group_roles::group_access_role_stages;
pub use groups::fetch_groups_stage;
pub use projects::fetch_projects_stage;
pub use user_roles::user_access_role_stages;
pub use users::fetch_users_stage;

use std::sync::Arc;

use lattice_pipeline::Stage;

use crate::provider::ResourceProvider;

/// Stage ids, referenced by `depends_on` declarations.
pub mod ids {
    pub const GROUPS: &str = "fetch-groups";
    pub const PROJECTS: &str = "fetch-projects";
    pub const USERS: &str = "fetch-users";
    pub const GROUP_ACCESS_ROLES: &str = "fetch-group-access-roles";
    pub const BUILD_GROUP_ACCESS_ROLE_ALLOWS_GROUP: &str = "build-group-access-role-allows-group";
    pub const USER_ACCESS_ROLES: &str = "fetch-user-access-roles";
    pub const BUILD_USER_ACCESS_ROLE_ALLOWS_USER: &str = "build-user-access-role-allows-user";
}

/// The full GitLab ingestion pipeline, in declaration order.
pub fn all_stages(provider: Arc<dyn ResourceProvider>) -> Vec<Stage> {
    let mut stages = vec![
        fetch_groups_stage(provider.clone()),
        fetch_projects_stage(provider.clone()),
        fetch_users_stage(provider.clone()),
    ];
    stages.extend(group_access_role_stages());
    stages.extend(user_access_role_stages(provider));
    stages
}
