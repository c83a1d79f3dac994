//! Commit status reporting.
//!
//! After a GitHub delivery is accepted, the gateway tells GitHub the commit is
//! being built. Reporting is best-effort: it runs in a spawned task after the
//! response has been decided, is never awaited by the request and never
//! retried. A failed report leaves a log line and nothing else.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use super::error::GitHubApiError;
use crate::types::Project;

/// GitHub's limit on a status description.
pub const MAX_DESCRIPTION_LEN: usize = 140;

/// Description sent with the pending status.
pub const PENDING_DESCRIPTION: &str = "Building";

/// Appended to text cut short by [`truncate_at`].
const TRUNCATION_MARKER: &str = "...";

/// State of a commit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusState {
    Pending,
    Failure,
}

impl StatusState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusState::Pending => "pending",
            StatusState::Failure => "failure",
        }
    }
}

/// A status update for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// The commit SHA the status is attached to.
    #[serde(skip)]
    pub commit: String,

    pub state: StatusState,

    /// Short description, at most [`MAX_DESCRIPTION_LEN`] characters.
    pub description: String,

    /// Label distinguishing this status from other checks on the commit.
    pub context: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl StatusUpdate {
    /// Creates an update, truncating the description to GitHub's limit.
    pub fn new(
        commit: impl Into<String>,
        state: StatusState,
        description: &str,
        context: impl Into<String>,
    ) -> Self {
        StatusUpdate {
            commit: commit.into(),
            state,
            description: truncate_at(description, MAX_DESCRIPTION_LEN),
            context: context.into(),
            target_url: None,
        }
    }

    /// The "build has started" update.
    pub fn pending(commit: impl Into<String>, context: impl Into<String>) -> Self {
        Self::new(commit, StatusState::Pending, PENDING_DESCRIPTION, context)
    }

    /// A failure update carrying an error message.
    pub fn failure(
        commit: impl Into<String>,
        context: impl Into<String>,
        error: &dyn std::error::Error,
    ) -> Self {
        Self::new(commit, StatusState::Failure, &error.to_string(), context)
    }

    pub fn with_target_url(mut self, url: Option<String>) -> Self {
        self.target_url = url;
        self
    }
}

/// Posts commit statuses to the provider.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Attaches `update` to its commit in the project's repository.
    async fn create_status(
        &self,
        project: &Project,
        update: &StatusUpdate,
    ) -> Result<(), GitHubApiError>;
}

/// Sends a status update in a task spawned on `tasks`.
///
/// The returned handle is for tests; request handlers drop it. The task is
/// not cancelled, timed out or retried here: the reporter owns its own
/// timeouts and a failure is only logged.
pub fn report_in_background(
    tasks: &TaskTracker,
    reporter: Arc<dyn StatusReporter>,
    project: Project,
    update: StatusUpdate,
) -> JoinHandle<()> {
    tasks.spawn(async move {
        match reporter.create_status(&project, &update).await {
            Ok(()) => debug!(
                project = %project.name,
                commit = %update.commit,
                state = update.state.as_str(),
                "Reported commit status"
            ),
            Err(e) => warn!(
                project = %project.name,
                commit = %update.commit,
                state = update.state.as_str(),
                error = %e,
                "Error setting commit status"
            ),
        }
    })
}

/// Truncates `s` to at most `max` characters.
///
/// Text that fits is returned unchanged. Longer text keeps its first
/// `max - 3` characters followed by `...`, so the result is exactly `max`
/// characters long. Counts characters, not bytes.
pub fn truncate_at(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let marker_len = TRUNCATION_MARKER.len();
    if max <= marker_len {
        return TRUNCATION_MARKER[..max].to_string();
    }
    let mut truncated: String = s.chars().take(max - marker_len).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
