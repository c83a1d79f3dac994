//! Project configuration as read from the store.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{ProjectId, RepoId};

/// A monitored repository or integration.
///
/// Created and updated by an external configuration process. The gateway
/// only ever reads projects.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique ID assigned by the store.
    pub id: ProjectId,

    /// Unique name, `org/repo` or a bare org.
    pub name: String,

    /// Shared secret for HMAC verification of GitHub deliveries.
    #[serde(default)]
    pub shared_secret: String,

    /// Script used when the repository has no build script of its own.
    #[serde(default)]
    pub default_script: Option<String>,

    /// Repository used for script fetches and status callbacks.
    #[serde(default)]
    pub repo: RepoConfig,

    /// Project-specific GitHub API token.
    #[serde(default)]
    pub github_token: Option<String>,
}

/// Repository reference of a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Repository reference, e.g. `github.com/org/repo`.
    ///
    /// Empty means the project has no repository configured and cannot take
    /// commit-bound events.
    #[serde(default)]
    pub name: String,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Project {
            id: ProjectId::new(id),
            name: name.into(),
            shared_secret: String::new(),
            default_script: None,
            repo: RepoConfig::default(),
            github_token: None,
        }
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.shared_secret = secret.into();
        self
    }

    pub fn with_default_script(mut self, script: impl Into<String>) -> Self {
        self.default_script = Some(script.into());
        self
    }

    pub fn with_repo(mut self, reference: impl Into<String>) -> Self {
        self.repo.name = reference.into();
        self
    }

    /// Returns true if a repository reference is configured.
    pub fn has_repo(&self) -> bool {
        !self.repo.name.trim().is_empty()
    }

    /// Returns the repository owner and name, if the reference parses.
    pub fn repo_id(&self) -> Option<RepoId> {
        RepoId::from_reference(&self.repo.name)
    }

    /// Returns the default script bytes, treating an empty script as absent.
    pub fn default_script_bytes(&self) -> Option<Vec<u8>> {
        self.default_script
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.as_bytes().to_vec())
    }
}

// Secrets and tokens stay out of logs.
impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("repo", &self.repo)
            .field("has_default_script", &self.default_script.is_some())
            .finish_non_exhaustive()
    }
}
