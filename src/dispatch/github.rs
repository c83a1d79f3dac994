//! GitHub deliveries: signed, many event types, synchronous build creation.

use tracing::{error, info, warn};

use super::{Dispatcher, Outcome, WebhookError};
use crate::builds::BuildRequest;
use crate::types::Provider;
use crate::webhooks::{
    Classification, EventRoute, repository_full_name, route_event, verify_signature,
};

/// One inbound GitHub delivery.
#[derive(Debug, Clone, Copy)]
pub struct GithubDelivery<'a> {
    /// The `X-GitHub-Event` header.
    pub event: &'a str,

    /// The `X-Hub-Signature` header, if sent.
    pub signature: Option<&'a str>,

    /// Project name from the route; when absent it is read from the payload.
    pub project_name: Option<&'a str>,

    /// The raw body, exactly as received.
    pub body: &'a [u8],
}

impl Dispatcher {
    /// Handles a GitHub delivery.
    ///
    /// The build is persisted before this returns, so the provider learns
    /// whether it was accepted. The commit status is sent afterwards in a
    /// background task.
    pub async fn handle_github(
        &self,
        delivery: GithubDelivery<'_>,
    ) -> Result<Outcome, WebhookError> {
        let event = delivery.event;
        let rule = match route_event(event) {
            EventRoute::Ping => {
                info!("Received ping from GitHub");
                return Ok(Outcome::Pong);
            }
            EventRoute::Unsupported => {
                info!(event = %event, "Ignoring unsupported event");
                return Ok(Outcome::Ignored);
            }
            EventRoute::Supported(rule) => rule,
        };

        let name = match delivery.project_name {
            Some(name) => name.to_string(),
            None => repository_full_name(delivery.body).map_err(|e| {
                warn!(event = %event, error = %e, "Failed to read repository from payload");
                WebhookError::MalformedBody(e.to_string())
            })?,
        };

        let project = self.resolve_project(&name).await?;

        // Fail closed: a project without a secret cannot authenticate anything.
        if project.shared_secret.is_empty() {
            warn!(project = %name, "No shared secret configured for project");
            return Err(WebhookError::InvalidSignature);
        }
        if !verify_signature(
            delivery.body,
            delivery.signature,
            project.shared_secret.as_bytes(),
        ) {
            warn!(project = %name, event = %event, "Invalid webhook signature");
            return Err(WebhookError::InvalidSignature);
        }

        let classified = match rule.classify(delivery.body) {
            Ok(Classification::Build(classified)) => classified,
            Ok(Classification::BranchDeleted) => {
                info!(project = %name, "Build skipped on branch deletion");
                return Ok(Outcome::BranchDeleted);
            }
            Err(e) => {
                warn!(project = %name, event = %event, error = %e, "Failed to parse payload");
                return Err(WebhookError::MalformedBody(e.to_string()));
            }
        };

        // Statuses need a repository to post to.
        if classified.commit_bearing && !project.has_repo() {
            warn!(project = %name, event = %event, "Project has no repository configured");
            return Err(WebhookError::MissingRepository(name));
        }

        let script = self.scripts.resolve(&project, &classified.commit).await;

        let request = BuildRequest {
            project: &project,
            event_type: &classified.event_type,
            provider: Provider::Github,
            commit: &classified.commit,
            payload: delivery.body,
            script,
        };
        match self.builds.create(request).await {
            Ok(_) => {
                if classified.commit_bearing {
                    self.report_pending(&project, &classified.commit);
                }
                Ok(Outcome::Accepted(Provider::Github))
            }
            Err(e) => {
                error!(
                    project = %name,
                    event_type = %classified.event_type,
                    commit = %classified.commit,
                    error = %e,
                    "Failed to create build"
                );
                if classified.commit_bearing {
                    self.report_failure(&project, &classified.commit, &e);
                }
                Err(WebhookError::BuildFailed(e))
            }
        }
    }
}
