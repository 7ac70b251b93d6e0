//! GitLab collaborator for the Lattice access graph
//!
//! Everything that knows about GitLab lives here:
//! - [`provider`]: typed API payloads, the [`ResourceProvider`] fetch
//!   surface, and the reqwest-backed [`GitlabClient`]
//! - [`config`]: environment-based integration configuration
//! - [`convert`]: pure converters from raw payloads to graph entities
//! - [`steps`]: the declared ingestion stages and their dependency edges
//!
//! The pipeline core (`lattice-pipeline`) consumes this crate only
//! through [`steps::all_stages`].

pub mod config;
pub mod convert;
pub mod provider;
pub mod steps;

pub use config::{ConfigError, GitlabConfig};
pub use provider::{GitlabClient, ProviderError, ResourceProvider};
