//! Integration configuration loaded from the environment.

#[derive(Debug, Clone)]
pub struct GitlabConfig {
    /// API base, for example `https://gitlab.com/api/v4`.
    pub base_url: String,
    /// Personal or group access token with `read_api` scope.
    pub token: String,
    /// Full path of the top-level group to ingest.
    pub group: String,
    pub timeout_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),
}

impl GitlabConfig {
    /// Load from `GITLAB_TOKEN`, `GITLAB_GROUP`, and optionally
    /// `GITLAB_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let token =
            std::env::var("GITLAB_TOKEN").map_err(|_| ConfigError::MissingVar("GITLAB_TOKEN"))?;
        let group =
            std::env::var("GITLAB_GROUP").map_err(|_| ConfigError::MissingVar("GITLAB_GROUP"))?;

        Ok(Self {
            base_url: std::env::var("GITLAB_BASE_URL")
                .unwrap_or_else(|_| "https://gitlab.com/api/v4".to_string()),
            token,
            group,
            timeout_secs: 30,
        })
    }

    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            group: group.into(),
            timeout_secs: 30,
        }
    }
}
