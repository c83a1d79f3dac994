//! Newtype wrappers for domain identifiers.
//!
//! These types keep project IDs, provider names and repository coordinates
//! from being mixed up with the free-form strings that flow through a webhook.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The unique ID of a project, as assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    pub fn new(s: impl Into<String>) -> Self {
        ProjectId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The provider a webhook delivery came from.
///
/// Fixed per endpoint: the GitHub route always produces `Github` builds, the
/// DockerHub route always produces `Dockerhub` builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Github,
    Dockerhub,
}

impl Provider {
    /// Returns the name stored on build records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Github => "github",
            Provider::Dockerhub => "dockerhub",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepoId {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses a project's repository reference into owner and name.
    ///
    /// Accepts `org/repo`, `github.com/org/repo` and full clone URLs such as
    /// `https://github.com/org/repo.git`. Only the last two path segments are
    /// used. Returns `None` when fewer than two non-empty segments remain.
    pub fn from_reference(reference: &str) -> Option<Self> {
        let trimmed = reference
            .trim()
            .trim_end_matches('/')
            .trim_end_matches(".git");
        let without_scheme = trimmed
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(trimmed);

        let mut segments = without_scheme.rsplit('/').filter(|s| !s.is_empty());
        let repo = segments.next()?;
        let owner = segments.next()?;
        Some(RepoId::new(owner, repo))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
