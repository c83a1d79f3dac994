//! HTTP server for the build gateway.
//!
//! # Endpoints
//!
//! - `POST /webhook/github` - GitHub delivery; project named by the payload
//! - `POST /webhook/github/{org}/{repo}` - GitHub delivery for a named project
//! - `POST /webhook/dockerhub/{org}[/{repo}[/{commit}]]` - image push, commit
//!   optionally given as `?commit=`
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::dispatch::Dispatcher;

pub mod webhook;

pub use webhook::{dockerhub_handler, github_handler, github_project_handler};

/// Largest request body accepted, matching GitHub's own cap on webhook
/// payloads.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state, passed to handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        AppState {
            inner: Arc::new(AppStateInner { dispatcher }),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }
}

/// Liveness check.
pub async fn health_handler() -> &'static str {
    "OK"
}

/// Builds the axum Router with all endpoints.
pub fn build_router(app_state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/webhook/github", post(github_handler))
        .route("/webhook/github/{org}/{repo}", post(github_project_handler))
        .route("/webhook/dockerhub/{org}", post(dockerhub_handler))
        .route("/webhook/dockerhub/{org}/{repo}", post(dockerhub_handler))
        .route(
            "/webhook/dockerhub/{org}/{repo}/{commit}",
            post(dockerhub_handler),
        )
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(app_state)
}
