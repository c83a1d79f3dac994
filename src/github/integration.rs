//! Production collaborators backed by the GitHub API.
//!
//! [`GitHubIntegration`] implements both [`FileGetter`] (contents API) and
//! [`StatusReporter`] (commit statuses API). Each call is scoped to the
//! project's repository; a project token, when configured, is used instead of
//! the gateway-wide one.

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

use super::client::{OctocrabClient, build_octocrab};
use super::error::GitHubApiError;
use super::status::{StatusReporter, StatusUpdate};
use crate::builds::{FetchError, FileGetter};
use crate::types::Project;

/// GitHub-backed file getter and status reporter.
#[derive(Clone)]
pub struct GitHubIntegration {
    /// Client used when a project has no token of its own.
    default_client: Octocrab,

    /// API endpoint override for project-specific clients.
    base_uri: Option<String>,
}

impl GitHubIntegration {
    pub fn new(default_client: Octocrab, base_uri: Option<String>) -> Self {
        GitHubIntegration {
            default_client,
            base_uri,
        }
    }

    /// Creates an integration authenticated with `token`, if given.
    pub fn from_token(
        token: Option<String>,
        base_uri: Option<String>,
    ) -> Result<Self, octocrab::Error> {
        let client = build_octocrab(token, base_uri.as_deref())?;
        Ok(Self::new(client, base_uri))
    }

    /// Returns a client scoped to the project's repository.
    fn client_for(&self, project: &Project) -> Result<OctocrabClient, GitHubApiError> {
        let repo = project.repo_id().ok_or_else(|| {
            GitHubApiError::without_source(format!(
                "project {} has no usable repository reference ({:?})",
                project.name, project.repo.name
            ))
        })?;

        match &project.github_token {
            Some(token) if !token.is_empty() => {
                OctocrabClient::from_token(token.clone(), self.base_uri.as_deref(), repo)
                    .map_err(|e| GitHubApiError::from_octocrab("building project client", e))
            }
            _ => Ok(OctocrabClient::new(self.default_client.clone(), repo)),
        }
    }
}

impl std::fmt::Debug for GitHubIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubIntegration")
            .field("base_uri", &self.base_uri)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl StatusReporter for GitHubIntegration {
    async fn create_status(
        &self,
        project: &Project,
        update: &StatusUpdate,
    ) -> Result<(), GitHubApiError> {
        let client = self.client_for(project)?;
        let route = format!(
            "/repos/{}/{}/statuses/{}",
            client.owner(),
            client.repo_name(),
            update.commit
        );

        debug!(
            repo = %client.repo(),
            commit = %update.commit,
            state = update.state.as_str(),
            "Posting commit status"
        );
        let _: serde_json::Value = client
            .inner()
            .post(route, Some(update))
            .await
            .map_err(|e| GitHubApiError::from_octocrab("creating commit status", e))?;
        Ok(())
    }
}

#[async_trait]
impl FileGetter for GitHubIntegration {
    async fn get_file(
        &self,
        project: &Project,
        commit: &str,
        path: &str,
    ) -> Result<Vec<u8>, FetchError> {
        if !project.has_repo() || project.repo_id().is_none() {
            return Err(FetchError::InvalidRepository(project.repo.name.clone()));
        }
        let client = self.client_for(project)?;

        let mut contents = client
            .inner()
            .repos(client.owner(), client.repo_name())
            .get_content()
            .path(path)
            .r#ref(commit)
            .send()
            .await
            .map_err(|e| GitHubApiError::from_octocrab("fetching file contents", e))
            .map_err(|e| {
                if e.is_not_found() {
                    FetchError::NotFound {
                        path: path.to_string(),
                        commit: commit.to_string(),
                    }
                } else {
                    FetchError::Api(e)
                }
            })?;

        // A directory listing or an item without inline content is as good
        // as a missing file.
        let file = contents.take_items().into_iter().next();
        file.and_then(|item| item.decoded_content())
            .map(String::into_bytes)
            .ok_or_else(|| FetchError::NotFound {
                path: path.to_string(),
                commit: commit.to_string(),
            })
    }
}
