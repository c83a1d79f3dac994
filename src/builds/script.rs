//! Build script resolution.
//!
//! The script normally lives in the repository at a fixed path and is fetched
//! at the commit being built. When that fails the project's default script is
//! used, and when there is no default either the build goes ahead without a
//! script. Resolution never fails the webhook request.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::github::GitHubApiError;
use crate::types::Project;

/// Errors from fetching a repository file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The file does not exist at that revision.
    #[error("{path} not found at {commit}")]
    NotFound { path: String, commit: String },

    /// The project's repository reference cannot be used for fetching.
    #[error("project repository {0:?} is not a usable repository reference")]
    InvalidRepository(String),

    /// The provider API call failed.
    #[error(transparent)]
    Api(#[from] GitHubApiError),
}

/// Fetches a file from a project's repository.
#[async_trait]
pub trait FileGetter: Send + Sync {
    /// Returns the contents of `path` at `commit`.
    async fn get_file(
        &self,
        project: &Project,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, FetchError>;
}

/// Chooses the script for a build.
#[derive(Clone)]
pub struct ScriptResolver {
    getter: Arc<dyn FileGetter>,
    script_path: String,
}

impl ScriptResolver {
    pub fn new(getter: Arc<dyn FileGetter>, script_path: impl Into<String>) -> Self {
        ScriptResolver {
            getter,
            script_path: script_path.into(),
        }
    }

    /// Resolves the script for `commit`.
    ///
    /// An empty fetched file counts as missing.
    pub async fn resolve(&self, project: &Project, commit: &str) -> Option<Vec<u8>> {
        match self
            .getter
            .get_file(project, commit, &self.script_path)
            .await
        {
            Ok(script) if !script.is_empty() => return Some(script),
            Ok(_) => debug!(
                project = %project.name,
                commit = %commit,
                path = %self.script_path,
                "Repository script is empty"
            ),
            Err(e) => info!(
                project = %project.name,
                commit = %commit,
                path = %self.script_path,
                error = %e,
                "Could not fetch repository script"
            ),
        }

        let fallback = project.default_script_bytes();
        if fallback.is_some() {
            debug!(project = %project.name, "Using project default script");
        }
        fallback
    }
}

impl std::fmt::Debug for ScriptResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptResolver")
            .field("script_path", &self.script_path)
            .finish_non_exhaustive()
    }
}
