//! Raw GitLab payload types.
//!
//! Fields mirror the API responses; everything beyond the id is optional
//! so records from older or trimmed-down instances still decode. The
//! full payload is what stages attach to the raw-record store.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabGroup {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabProject {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path_with_namespace: String,
    #[serde(default)]
    pub visibility: Option<String>,
    /// Groups this project has been shared with. Each entry becomes a
    /// group access role entity.
    #[serde(default)]
    pub shared_with_groups: Vec<GitlabGroupRef>,
}

/// Entry of a project's `shared_with_groups` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabGroupRef {
    pub group_id: u64,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub group_access_level: Option<u32>,
}

/// Member entry returned by group and project membership endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitlabUserRef {
    pub id: u64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub access_level: Option<u32>,
}
