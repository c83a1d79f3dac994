//! Reasons a webhook delivery is rejected.

use thiserror::Error;

use crate::store::StoreError;

/// Errors that end a webhook request with a non-success response.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// The body could not be read or decoded.
    #[error("malformed body: {0}")]
    MalformedBody(String),

    /// The body is larger than the server accepts.
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// No project matches the delivery.
    #[error("project {0:?} not found")]
    ProjectNotFound(String),

    /// The project has no repository reference but the event needs one.
    #[error("project {0:?} has no repository configured")]
    MissingRepository(String),

    /// Signature missing, malformed or wrong, or no secret to check against.
    #[error("invalid signature")]
    InvalidSignature,

    /// The store rejected the build.
    #[error("build creation failed: {0}")]
    BuildFailed(#[source] StoreError),
}

impl WebhookError {
    /// The short text sent back to the provider.
    pub fn status_text(&self) -> &'static str {
        match self {
            WebhookError::MissingHeader(_) => "missing required header",
            WebhookError::MalformedBody(_) => "Malformed body",
            WebhookError::PayloadTooLarge(_) => "payload too large",
            WebhookError::ProjectNotFound(_) => "project not found",
            WebhookError::MissingRepository(_) => "repository not configured",
            WebhookError::InvalidSignature => "malformed signature",
            WebhookError::BuildFailed(_) => "build failed",
        }
    }
}
