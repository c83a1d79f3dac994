//! Webhook endpoint handlers.
//!
//! Thin adapters from HTTP to the [`Dispatcher`](crate::dispatch::Dispatcher):
//! they pull headers, route parameters and the raw body out of the request,
//! hand them over, and turn the result into a JSON `{"status": ...}` reply.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{debug, warn};

use super::AppState;
use crate::dispatch::{DockerhubDelivery, GithubDelivery, Outcome, WebhookError, project_name};

/// Header carrying the GitHub event label.
const HEADER_EVENT: &str = "x-github-event";
/// Header carrying the HMAC-SHA1 signature.
const HEADER_SIGNATURE: &str = "x-hub-signature";

/// Query parameter that overrides the DockerHub commit path segment.
const COMMIT_QUERY: &str = "commit";

fn status_response(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "status": text }))).into_response()
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_)
            | WebhookError::MalformedBody(_)
            | WebhookError::ProjectNotFound(_)
            | WebhookError::MissingRepository(_) => StatusCode::BAD_REQUEST,
            WebhookError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::BuildFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        status_response(status, self.status_text())
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        status_response(StatusCode::OK, self.status_text())
    }
}

/// `POST /webhook/github`: the project is named by the payload.
pub async fn github_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Outcome, WebhookError> {
    dispatch_github(&app_state, &headers, None, body).await
}

/// `POST /webhook/github/{org}/{repo}`: the project is named by the path.
pub async fn github_project_handler(
    State(app_state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Outcome, WebhookError> {
    let name = project_name(&org, Some(&repo));
    dispatch_github(&app_state, &headers, Some(&name), body).await
}

async fn dispatch_github(
    app_state: &AppState,
    headers: &HeaderMap,
    project_name: Option<&str>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Outcome, WebhookError> {
    let event =
        header_str(headers, HEADER_EVENT).ok_or(WebhookError::MissingHeader(HEADER_EVENT))?;
    let body = read_body(body)?;
    debug!(event = %event, bytes = body.len(), "Received GitHub webhook");

    app_state
        .dispatcher()
        .handle_github(GithubDelivery {
            event,
            signature: header_str(headers, HEADER_SIGNATURE),
            project_name,
            body: &body,
        })
        .await
}

/// `POST /webhook/dockerhub/{org}[/{repo}[/{commit}]]`.
///
/// The `commit` query parameter wins over the path segment; with neither the
/// commit is empty.
pub async fn dockerhub_handler(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    Query(query): Query<HashMap<String, String>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Outcome, WebhookError> {
    let org = params.get("org").map(String::as_str).unwrap_or_default();
    let name = project_name(org, params.get("repo").map(String::as_str));
    let commit = query
        .get(COMMIT_QUERY)
        .filter(|c| !c.is_empty())
        .or_else(|| params.get("commit"))
        .cloned()
        .unwrap_or_default();
    let body = read_body(body)?;
    debug!(project = %name, commit = %commit, "Received DockerHub webhook");

    app_state
        .dispatcher()
        .handle_dockerhub(DockerhubDelivery {
            project_name: name,
            commit,
            body: body.to_vec(),
        })
        .await
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, WebhookError> {
    body.map_err(|e| {
        warn!(error = %e, "Failed to read body");
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            WebhookError::PayloadTooLarge(e.body_text())
        } else {
            WebhookError::MalformedBody(e.body_text())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use http_body_util::BodyExt;

    async fn into_parts(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let cases = [
            (
                WebhookError::MissingHeader(HEADER_EVENT),
                StatusCode::BAD_REQUEST,
                "missing required header",
            ),
            (
                WebhookError::MalformedBody("eof".to_string()),
                StatusCode::BAD_REQUEST,
                "Malformed body",
            ),
            (
                WebhookError::PayloadTooLarge("length limit exceeded".to_string()),
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload too large",
            ),
            (
                WebhookError::ProjectNotFound("o/r".to_string()),
                StatusCode::BAD_REQUEST,
                "project not found",
            ),
            (
                WebhookError::MissingRepository("o/r".to_string()),
                StatusCode::BAD_REQUEST,
                "repository not configured",
            ),
            (
                WebhookError::InvalidSignature,
                StatusCode::UNAUTHORIZED,
                "malformed signature",
            ),
            (
                WebhookError::BuildFailed(StoreError::Backend("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "build failed",
            ),
        ];

        for (error, expected_status, expected_text) in cases {
            let (status, body) = into_parts(error.into_response()).await;
            assert_eq!(status, expected_status);
            assert_eq!(body, json!({ "status": expected_text }));
        }
    }

    #[tokio::test]
    async fn outcomes_are_ok() {
        let (status, body) = into_parts(Outcome::Ignored.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "Ignored" }));
    }

    #[test]
    fn header_str_skips_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_EVENT, "push".parse().unwrap());

        assert_eq!(header_str(&headers, HEADER_EVENT), Some("push"));
        assert_eq!(header_str(&headers, HEADER_SIGNATURE), None);
    }
}
