//! In-memory store seeded from a projects file.
//!
//! Used by the binary when no external backend is configured, and handy for
//! local experiments: builds are kept in creation order and can be listed.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{Store, StoreError};
use crate::types::{Build, Project};

/// A [`Store`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    projects: RwLock<HashMap<String, Project>>,
    builds: RwLock<Vec<Build>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given projects, keyed by name.
    pub fn with_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        let projects = projects
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        InMemoryStore {
            projects: RwLock::new(projects),
            builds: RwLock::new(Vec::new()),
        }
    }

    /// Loads projects from a JSON file containing an array of projects.
    pub fn from_projects_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| {
            StoreError::Backend(format!("reading {}: {}", path.display(), e))
        })?;
        let projects: Vec<Project> = serde_json::from_slice(&contents).map_err(|e| {
            StoreError::Backend(format!("parsing {}: {}", path.display(), e))
        })?;

        info!(path = %path.display(), count = projects.len(), "Loaded projects");
        Ok(Self::with_projects(projects))
    }

    /// Returns all builds created so far, oldest first.
    pub async fn builds(&self) -> Vec<Build> {
        self.builds.read().await.clone()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn get_project(&self, name: &str) -> Result<Project, StoreError> {
        self.projects
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::ProjectNotFound(name.to_string()))
    }

    async fn create_build(&self, build: &Build) -> Result<(), StoreError> {
        debug!(
            project_id = %build.project_id,
            event_type = %build.event_type,
            commit = %build.commit,
            "Storing build"
        );
        self.builds.write().await.push(build.clone());
        Ok(())
    }
}
