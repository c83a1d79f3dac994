//! Octocrab client wrapper scoped to a specific repository.
//!
//! Status updates and file fetches are always about one project's repository;
//! `OctocrabClient` pairs an `Octocrab` instance with that repository so the
//! call sites only deal in commits and paths.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    /// The underlying octocrab client.
    client: Octocrab,

    /// The repository this client is scoped to.
    repo: RepoId,
}

impl OctocrabClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates a client from a GitHub token.
    ///
    /// `base_uri` overrides the API endpoint (GitHub Enterprise).
    pub fn from_token(
        token: impl Into<String>,
        base_uri: Option<&str>,
        repo: RepoId,
    ) -> Result<Self, octocrab::Error> {
        let client = build_octocrab(Some(token.into()), base_uri)?;
        Ok(Self::new(client, repo))
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

/// Builds an octocrab instance, optionally authenticated and pointed at a
/// non-default API endpoint.
pub fn build_octocrab(
    token: Option<String>,
    base_uri: Option<&str>,
) -> Result<Octocrab, octocrab::Error> {
    let mut builder = Octocrab::builder();
    if let Some(token) = token {
        builder = builder.personal_token(token);
    }
    if let Some(uri) = base_uri {
        builder = builder.base_uri(uri)?;
    }
    builder.build()
}
