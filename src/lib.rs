//! Build Gateway - turns provider webhooks into build records.
//!
//! Deliveries from GitHub (HMAC-SHA1 signed) and DockerHub-compatible agents
//! are authenticated, classified and persisted as builds through a pluggable
//! store. GitHub commits get a pending status once their build is accepted.

pub mod builds;
pub mod config;
pub mod dispatch;
pub mod github;
pub mod server;
pub mod store;
pub mod types;
pub mod webhooks;

#[cfg(test)]
pub(crate) mod test_utils;
