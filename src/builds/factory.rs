//! Build record construction and submission.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::store::{Store, StoreError};
use crate::types::{Build, Project, Provider};

/// Everything needed to create one build.
#[derive(Debug, Clone)]
pub struct BuildRequest<'a> {
    pub project: &'a Project,
    pub event_type: &'a str,
    pub provider: Provider,
    pub commit: &'a str,
    pub payload: &'a [u8],
    pub script: Option<Vec<u8>>,
}

/// Creates build records and submits them to the store.
#[derive(Clone)]
pub struct BuildFactory {
    store: Arc<dyn Store>,
}

impl BuildFactory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        BuildFactory { store }
    }

    /// Assembles the build record for a request.
    pub fn assemble(request: BuildRequest<'_>) -> Build {
        Build {
            project_id: request.project.id.clone(),
            event_type: request.event_type.to_string(),
            provider: request.provider,
            commit: request.commit.to_string(),
            payload: request.payload.to_vec(),
            script: request.script.filter(|s| !s.is_empty()),
            created_at: Utc::now(),
        }
    }

    /// Assembles a build and persists it with a single store call.
    ///
    /// Store errors are returned unchanged; whether they reach the provider
    /// is the caller's decision.
    pub async fn create(&self, request: BuildRequest<'_>) -> Result<Build, StoreError> {
        let project_name = request.project.name.clone();
        let build = Self::assemble(request);
        self.store.create_build(&build).await?;

        info!(
            project = %project_name,
            event_type = %build.event_type,
            provider = %build.provider,
            commit = %build.commit,
            has_script = build.script.is_some(),
            "Build created"
        );
        Ok(build)
    }
}

impl std::fmt::Debug for BuildFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildFactory").finish_non_exhaustive()
    }
}
