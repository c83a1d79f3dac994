//! DockerHub deliveries: unsigned, a single `image_push` event, build created
//! in the background after the response.

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{Dispatcher, Outcome, WebhookError};
use crate::builds::{BuildFactory, BuildRequest};
use crate::types::{Project, Provider};

/// Event tag of every DockerHub build.
pub const IMAGE_PUSH_EVENT: &str = "image_push";

/// One inbound DockerHub delivery.
#[derive(Debug, Clone)]
pub struct DockerhubDelivery {
    /// `org/repo`, or the bare org.
    pub project_name: String,

    /// The revision to build, usually an image tag. May be empty.
    pub commit: String,

    pub body: Vec<u8>,
}

impl Dispatcher {
    /// Handles a DockerHub delivery.
    ///
    /// Only the project and its repository reference are checked before
    /// answering. The build itself is created in a spawned task, so a store
    /// failure here is logged and never reaches the caller.
    pub async fn handle_dockerhub(
        &self,
        delivery: DockerhubDelivery,
    ) -> Result<Outcome, WebhookError> {
        self.accept_dockerhub(delivery)
            .await
            .map(|_| Outcome::Accepted(Provider::Dockerhub))
    }

    /// Validates the delivery and spawns build creation, returning the task.
    pub(super) async fn accept_dockerhub(
        &self,
        delivery: DockerhubDelivery,
    ) -> Result<JoinHandle<()>, WebhookError> {
        let DockerhubDelivery {
            project_name,
            commit,
            body,
        } = delivery;
        info!(project = %project_name, commit = %commit, "Received image push");

        let project = self.resolve_project(&project_name).await?;
        if !project.has_repo() {
            warn!(project = %project_name, "Project has no repository configured");
            return Err(WebhookError::MissingRepository(project_name));
        }

        let builds = self.builds.clone();
        Ok(self.tasks.spawn(async move {
            create_image_push_build(builds, project, commit, body).await;
        }))
    }
}

async fn create_image_push_build(
    builds: BuildFactory,
    project: Project,
    commit: String,
    payload: Vec<u8>,
) {
    // An image tag is not a repository revision, so there is nothing to fetch.
    let script = project.default_script_bytes();
    let request = BuildRequest {
        project: &project,
        event_type: IMAGE_PUSH_EVENT,
        provider: Provider::Dockerhub,
        commit: &commit,
        payload: &payload,
        script,
    };
    if let Err(e) = builds.create(request).await {
        error!(
            project = %project.name,
            commit = %commit,
            error = %e,
            "Failed to create image push build"
        );
    }
}
