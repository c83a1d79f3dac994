//! Per-request webhook orchestration.
//!
//! The [`Dispatcher`] drives one delivery through its states:
//!
//! ```text
//! Received -> BodyRead -> ProjectResolved -> SignatureChecked (GitHub only)
//!          -> EventClassified -> { Ignored | Rejected
//!                                | ScriptResolved -> BuildPersisted -> (StatusReported) }
//! ```
//!
//! Everything that decides whether a build is accepted happens before the
//! response. Side reporting (commit statuses, and DockerHub build creation)
//! runs in tracked tasks that the response never waits for; shutdown drains
//! them with [`Dispatcher::drain_background_tasks`].
//!
//! Collaborators are injected through [`Dispatcher::new`]; there is no
//! global state.

use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::builds::{BuildFactory, FileGetter, ScriptResolver};
use crate::github::{StatusReporter, StatusUpdate, report_in_background};
use crate::store::{Store, StoreError};
use crate::types::{Project, Provider};

mod dockerhub;
mod error;
mod github;

pub use dockerhub::DockerhubDelivery;
pub use error::WebhookError;
pub use github::GithubDelivery;

/// Default repository path of the build script.
pub const DEFAULT_SCRIPT_PATH: &str = "build.js";

/// Default context label on commit statuses.
pub const DEFAULT_STATUS_CONTEXT: &str = "build-gateway";

/// Dispatcher settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Repository path the build script is fetched from.
    pub script_path: String,

    /// Context label on commit statuses.
    pub status_context: String,

    /// Target URL attached to commit statuses.
    pub status_target_url: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            script_path: DEFAULT_SCRIPT_PATH.to_string(),
            status_context: DEFAULT_STATUS_CONTEXT.to_string(),
            status_target_url: None,
        }
    }
}

/// Successful end states of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A `ping` was answered.
    Pong,

    /// The event type is not supported; nothing was built.
    Ignored,

    /// A push deleted its branch; nothing was built.
    BranchDeleted,

    /// A build was created (GitHub) or scheduled (DockerHub).
    Accepted(Provider),
}

impl Outcome {
    /// The short text sent back to the provider.
    pub fn status_text(&self) -> &'static str {
        match self {
            Outcome::Pong => "OK",
            Outcome::Ignored => "Ignored",
            Outcome::BranchDeleted => "build skipped on branch deletion",
            Outcome::Accepted(Provider::Github) => "Complete",
            Outcome::Accepted(Provider::Dockerhub) => "Success",
        }
    }
}

/// Builds a project name from route parameters: `org/repo`, or the bare org
/// when there is no repo segment.
pub fn project_name(org: &str, repo: Option<&str>) -> String {
    match repo {
        Some(repo) if !repo.is_empty() => format!("{}/{}", org, repo),
        _ => org.to_string(),
    }
}

/// Orchestrates webhook deliveries.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn Store>,
    builds: BuildFactory,
    scripts: ScriptResolver,
    reporter: Arc<dyn StatusReporter>,
    config: DispatchConfig,
    tasks: TaskTracker,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn Store>,
        file_getter: Arc<dyn FileGetter>,
        reporter: Arc<dyn StatusReporter>,
        config: DispatchConfig,
    ) -> Self {
        Dispatcher {
            builds: BuildFactory::new(store.clone()),
            scripts: ScriptResolver::new(file_getter, config.script_path.clone()),
            store,
            reporter,
            config,
            tasks: TaskTracker::new(),
        }
    }

    /// Stops accepting background work and waits for what is in flight.
    ///
    /// Called once the HTTP server has stopped. Status reports and DockerHub
    /// builds already answered for get to finish (or log their failure).
    pub async fn drain_background_tasks(&self) {
        self.tasks.close();
        if !self.tasks.is_empty() {
            info!(pending = self.tasks.len(), "Waiting for background tasks");
        }
        self.tasks.wait().await;
    }

    /// Looks up a project, mapping any store failure to a client error.
    async fn resolve_project(&self, name: &str) -> Result<Project, WebhookError> {
        match self.store.get_project(name).await {
            Ok(project) => {
                if project.name != name {
                    warn!(
                        requested = %name,
                        stored = %project.name,
                        "Project name does not match the requested name"
                    );
                }
                Ok(project)
            }
            Err(e) => {
                warn!(project = %name, error = %e, "Project not found");
                Err(WebhookError::ProjectNotFound(name.to_string()))
            }
        }
    }

    /// Sends the pending status for an accepted commit, in the background.
    fn report_pending(&self, project: &Project, commit: &str) {
        let update = StatusUpdate::pending(commit, self.config.status_context.clone())
            .with_target_url(self.config.status_target_url.clone());
        report_in_background(&self.tasks, self.reporter.clone(), project.clone(), update);
    }

    /// Sends a failure status carrying the store error, in the background.
    fn report_failure(&self, project: &Project, commit: &str, error: &StoreError) {
        let update = StatusUpdate::failure(commit, self.config.status_context.clone(), error)
            .with_target_url(self.config.status_target_url.clone());
        report_in_background(&self.tasks, self.reporter.clone(), project.clone(), update);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("background_tasks", &self.tasks.len())
            .finish_non_exhaustive()
    }
}
