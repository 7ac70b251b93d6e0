//! GitLab API collaborator: typed payloads and the fetch surface the
//! ingestion stages use.

mod client;
mod types;

pub use client::GitlabClient;
pub use types::{GitlabGroup, GitlabGroupRef, GitlabProject, GitlabUserRef};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API error: HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),
}

/// Fetch surface of the resource-management API.
///
/// A failed call is reported to the executing stage, which decides
/// between skip-and-log for a single item and failing the whole stage.
/// Request timeouts are the implementation's responsibility.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// The configured top-level group and its descendants.
    async fn fetch_groups(&self) -> Result<Vec<GitlabGroup>, ProviderError>;

    async fn fetch_group_projects(&self, group_id: u64)
        -> Result<Vec<GitlabProject>, ProviderError>;

    async fn fetch_group_members(&self, group_id: u64) -> Result<Vec<GitlabUserRef>, ProviderError>;

    async fn fetch_project_members(
        &self,
        project_id: u64,
    ) -> Result<Vec<GitlabUserRef>, ProviderError>;
}
