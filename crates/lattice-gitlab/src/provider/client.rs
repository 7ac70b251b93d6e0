//! reqwest-backed GitLab API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{GitlabGroup, GitlabProject, GitlabUserRef, ProviderError, ResourceProvider};
use crate::config::GitlabConfig;

pub struct GitlabClient {
    client: Client,
    base_url: String,
    token: String,
    group: String,
}

impl GitlabClient {
    pub fn new(config: &GitlabConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            group: config.group.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .query(&[("per_page", "100")])
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Group paths appear in URL path segments, so `/` must be escaped.
fn encode_path(path: &str) -> String {
    path.replace('/', "%2F")
}

#[async_trait]
impl ResourceProvider for GitlabClient {
    async fn fetch_groups(&self) -> Result<Vec<GitlabGroup>, ProviderError> {
        let root: GitlabGroup = self
            .get_json(&format!("groups/{}", encode_path(&self.group)))
            .await?;
        let mut groups: Vec<GitlabGroup> = self
            .get_json(&format!(
                "groups/{}/descendant_groups",
                encode_path(&self.group)
            ))
            .await?;
        groups.insert(0, root);
        Ok(groups)
    }

    async fn fetch_group_projects(
        &self,
        group_id: u64,
    ) -> Result<Vec<GitlabProject>, ProviderError> {
        self.get_json(&format!("groups/{}/projects", group_id)).await
    }

    async fn fetch_group_members(
        &self,
        group_id: u64,
    ) -> Result<Vec<GitlabUserRef>, ProviderError> {
        self.get_json(&format!("groups/{}/members", group_id)).await
    }

    async fn fetch_project_members(
        &self,
        project_id: u64,
    ) -> Result<Vec<GitlabUserRef>, ProviderError> {
        self.get_json(&format!("projects/{}/members", project_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slashes_in_group_paths_are_escaped() {
        assert_eq!(encode_path("acme/platform"), "acme%2Fplatform");
        assert_eq!(encode_path("acme"), "acme");
    }
}
