//! Stable entity keys derived from raw source identifiers.
//!
//! Stages never share runtime state directly. A later stage finds the
//! entities an earlier stage created by re-deriving their keys from the
//! foreign ids carried in raw records, so key derivation must be pure,
//! deterministic, and collision-free across source kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, globally unique identity of a graph entity.
///
/// Keys are only ever produced by [`entity_key`]; two entities with the
/// same key are the same logical node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source-system namespaces that can contribute entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Group,
    Project,
    User,
    GroupAccessRole,
    UserAccessRole,
}

impl SourceKind {
    /// Key namespace tag. Tags never contain `:`, so a key splits
    /// unambiguously at its first separator into `(tag, id)`.
    pub fn tag(&self) -> &'static str {
        match self {
            SourceKind::Group => "gitlab-group",
            SourceKind::Project => "gitlab-project",
            SourceKind::User => "gitlab-user",
            SourceKind::GroupAccessRole => "gitlab-group-access-role",
            SourceKind::UserAccessRole => "gitlab-user-access-role",
        }
    }
}

/// Deterministically derive the graph key for a raw source identifier.
///
/// The same `(kind, id)` pair always yields the same key, within and
/// across runs, which is what makes re-ingestion idempotent. Distinct
/// pairs never collide: the tag portion before the first `:` identifies
/// the kind, and within one kind ids are unique in the source system.
pub fn entity_key(kind: SourceKind, id: impl fmt::Display) -> EntityKey {
    EntityKey(format!("{}:{}", kind.tag(), id))
}
