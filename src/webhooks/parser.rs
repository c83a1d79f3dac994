//! GitHub webhook payload parser.
//!
//! This module decodes the handful of fields the gateway needs from raw
//! webhook JSON. It is deliberately lenient: unknown fields are ignored and
//! only the fields that carry the repository, commit and action are required.
//!
//! # Parsing Strategy
//!
//! 1. [`repository_full_name`] reads just `repository.full_name`, which is
//!    enough to locate the project (and its secret) before the signature is
//!    checked.
//! 2. After verification, the event-specific extractor for the delivery's
//!    `X-GitHub-Event` produces [`EventDetails`].
//! 3. Malformed payloads return `Err` with details.

use serde::Deserialize;
use thiserror::Error;

/// Error type for webhook parsing failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON deserialization failed (includes missing required fields).
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required field is present but empty.
    #[error("missing value for {field}")]
    MissingField { field: &'static str },
}

/// The event-specific fields a classifier needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    /// Commit SHA or ref name the build should run against.
    pub commit: String,

    /// The payload's `action` field, if it has one.
    pub action: Option<String>,

    /// True for a push that deleted its ref.
    pub deleted: bool,
}

impl EventDetails {
    fn new(commit: String) -> Self {
        EventDetails {
            commit,
            action: None,
            deleted: false,
        }
    }

    fn with_action(mut self, action: Option<String>) -> Self {
        self.action = action.filter(|a| !a.is_empty());
        self
    }
}

// ============================================================================
// Raw payload structures for deserialization
//
// These match GitHub's webhook JSON structure. Only the fields we read are
// declared; serde ignores the rest.
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawRepositoryEnvelope {
    repository: RawRepository,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: String,
}

/// Reads `repository.full_name` from a payload.
///
/// This is the project name the delivery is addressed to.
pub fn repository_full_name(payload: &[u8]) -> Result<String, ParseError> {
    let raw: RawRepositoryEnvelope = serde_json::from_slice(payload)?;
    non_empty(raw.repository.full_name, "repository.full_name")
}

fn non_empty(value: String, field: &'static str) -> Result<String, ParseError> {
    if value.trim().is_empty() {
        Err(ParseError::MissingField { field })
    } else {
        Ok(value)
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ParseError> {
    non_empty(value.unwrap_or_default(), field)
}

// ============================================================================
// push event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPushPayload {
    #[serde(default)]
    deleted: bool,
    head_commit: Option<RawCommit>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    id: String,
}

/// Extracts the head commit of a push.
///
/// A branch deletion has no head commit; it is reported with `deleted` set
/// and whatever `after` carries (all zeros, in practice).
pub fn parse_push(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawPushPayload = serde_json::from_slice(payload)?;

    if raw.deleted {
        let mut details = EventDetails::new(raw.after.unwrap_or_default());
        details.deleted = true;
        return Ok(details);
    }

    let commit = raw.head_commit.map(|c| c.id).or(raw.after);
    Ok(EventDetails::new(required(commit, "head_commit.id")?))
}

// ============================================================================
// pull_request and pull_request_review events
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawPullRequestPayload {
    action: Option<String>,
    pull_request: RawPullRequest,
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    head: RawHead,
}

#[derive(Debug, Deserialize)]
struct RawHead {
    sha: String,
}

/// Extracts the PR head SHA and action. Shared by `pull_request` and
/// `pull_request_review`, whose payloads both embed the pull request.
pub fn parse_pull_request(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawPullRequestPayload = serde_json::from_slice(payload)?;
    let commit = non_empty(raw.pull_request.head.sha, "pull_request.head.sha")?;
    Ok(EventDetails::new(commit).with_action(raw.action))
}

// ============================================================================
// status event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawStatusPayload {
    sha: String,
}

pub fn parse_status(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawStatusPayload = serde_json::from_slice(payload)?;
    Ok(EventDetails::new(non_empty(raw.sha, "sha")?))
}

// ============================================================================
// release and create events
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawReleasePayload {
    action: Option<String>,
    release: RawRelease,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    tag_name: String,
}

/// Extracts the release's tag name.
pub fn parse_release(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawReleasePayload = serde_json::from_slice(payload)?;
    let tag = non_empty(raw.release.tag_name, "release.tag_name")?;
    Ok(EventDetails::new(tag).with_action(raw.action))
}

#[derive(Debug, Deserialize)]
struct RawCreatePayload {
    #[serde(rename = "ref")]
    ref_name: String,
}

/// Extracts the created tag or branch name.
pub fn parse_create(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawCreatePayload = serde_json::from_slice(payload)?;
    Ok(EventDetails::new(non_empty(raw.ref_name, "ref")?))
}

// ============================================================================
// commit_comment event
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawCommitCommentPayload {
    action: Option<String>,
    comment: RawCommitComment,
}

#[derive(Debug, Deserialize)]
struct RawCommitComment {
    commit_id: String,
}

pub fn parse_commit_comment(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawCommitCommentPayload = serde_json::from_slice(payload)?;
    let commit = non_empty(raw.comment.commit_id, "comment.commit_id")?;
    Ok(EventDetails::new(commit).with_action(raw.action))
}

// ============================================================================
// deployment and deployment_status events
// ============================================================================

#[derive(Debug, Deserialize)]
struct RawDeploymentPayload {
    action: Option<String>,
    deployment: RawDeployment,
}

#[derive(Debug, Deserialize)]
struct RawDeployment {
    sha: String,
}

/// Extracts the deployed commit. Shared by `deployment` and
/// `deployment_status`, whose payloads both embed the deployment.
pub fn parse_deployment(payload: &[u8]) -> Result<EventDetails, ParseError> {
    let raw: RawDeploymentPayload = serde_json::from_slice(payload)?;
    let commit = non_empty(raw.deployment.sha, "deployment.sha")?;
    Ok(EventDetails::new(commit).with_action(raw.action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn repository_full_name_valid() {
        let payload = bytes(json!({
            "repository": { "full_name": "octocat/hello-world", "name": "hello-world" }
        }));
        assert_eq!(
            repository_full_name(&payload).unwrap(),
            "octocat/hello-world"
        );
    }

    #[test]
    fn repository_full_name_missing_repository() {
        let payload = bytes(json!({ "action": "opened" }));
        assert!(matches!(
            repository_full_name(&payload),
            Err(ParseError::JsonError(_))
        ));
    }

    #[test]
    fn repository_full_name_empty() {
        let payload = bytes(json!({ "repository": { "full_name": "" } }));
        assert!(matches!(
            repository_full_name(&payload),
            Err(ParseError::MissingField {
                field: "repository.full_name"
            })
        ));
    }

    #[test]
    fn repository_full_name_not_json() {
        assert!(repository_full_name(b"not json").is_err());
        assert!(repository_full_name(b"").is_err());
    }

    #[test]
    fn push_uses_head_commit() {
        let payload = bytes(json!({
            "ref": "refs/heads/main",
            "after": "1111111111111111111111111111111111111111",
            "deleted": false,
            "head_commit": { "id": "2222222222222222222222222222222222222222" }
        }));
        let details = parse_push(&payload).unwrap();
        assert_eq!(details.commit, "2222222222222222222222222222222222222222");
        assert!(!details.deleted);
        assert_eq!(details.action, None);
    }

    #[test]
    fn push_falls_back_to_after() {
        let payload = bytes(json!({
            "after": "1111111111111111111111111111111111111111",
            "head_commit": null
        }));
        let details = parse_push(&payload).unwrap();
        assert_eq!(details.commit, "1111111111111111111111111111111111111111");
    }

    #[test]
    fn push_branch_deletion() {
        let payload = bytes(json!({
            "ref": "refs/heads/feature",
            "after": "0000000000000000000000000000000000000000",
            "deleted": true,
            "head_commit": null
        }));
        let details = parse_push(&payload).unwrap();
        assert!(details.deleted);
    }

    #[test]
    fn push_without_any_commit_is_error() {
        let payload = bytes(json!({ "deleted": false, "head_commit": null }));
        assert!(matches!(
            parse_push(&payload),
            Err(ParseError::MissingField { .. })
        ));
    }

    #[test]
    fn pull_request_head_sha_and_action() {
        let payload = bytes(json!({
            "action": "labeled",
            "pull_request": { "number": 1, "head": { "sha": "abc123", "ref": "feature" } }
        }));
        let details = parse_pull_request(&payload).unwrap();
        assert_eq!(details.commit, "abc123");
        assert_eq!(details.action.as_deref(), Some("labeled"));
    }

    #[test]
    fn pull_request_empty_action_is_none() {
        let payload = bytes(json!({
            "action": "",
            "pull_request": { "head": { "sha": "abc123" } }
        }));
        assert_eq!(parse_pull_request(&payload).unwrap().action, None);
    }

    #[test]
    fn pull_request_missing_head_is_error() {
        let payload = bytes(json!({ "action": "opened", "pull_request": {} }));
        assert!(parse_pull_request(&payload).is_err());
    }

    #[test]
    fn status_sha() {
        let payload = bytes(json!({ "sha": "abc", "state": "success" }));
        assert_eq!(parse_status(&payload).unwrap().commit, "abc");
    }

    #[test]
    fn release_tag_name() {
        let payload = bytes(json!({
            "action": "published",
            "release": { "tag_name": "0.0.1" }
        }));
        let details = parse_release(&payload).unwrap();
        assert_eq!(details.commit, "0.0.1");
        assert_eq!(details.action.as_deref(), Some("published"));
    }

    #[test]
    fn create_ref() {
        let payload = bytes(json!({ "ref": "0.0.1", "ref_type": "tag" }));
        assert_eq!(parse_create(&payload).unwrap().commit, "0.0.1");
    }

    #[test]
    fn commit_comment_commit_id() {
        let payload = bytes(json!({
            "action": "created",
            "comment": { "commit_id": "def456", "body": "nice" }
        }));
        assert_eq!(parse_commit_comment(&payload).unwrap().commit, "def456");
    }

    #[test]
    fn deployment_sha() {
        let payload = bytes(json!({ "deployment": { "sha": "fed321", "ref": "main" } }));
        assert_eq!(parse_deployment(&payload).unwrap().commit, "fed321");
    }

    #[test]
    fn deployment_status_uses_deployment_sha() {
        let payload = bytes(json!({
            "deployment_status": { "state": "success" },
            "deployment": { "sha": "fed321" }
        }));
        assert_eq!(parse_deployment(&payload).unwrap().commit, "fed321");
    }
}
