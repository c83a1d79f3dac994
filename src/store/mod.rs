//! The store collaborator: project lookup and build persistence.
//!
//! The gateway never owns persistent state. It reads projects and writes
//! builds through the [`Store`] trait; production wiring supplies a backend,
//! tests supply recording doubles.

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{Build, Project};

pub mod memory;

pub use memory::InMemoryStore;

/// Errors reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No project is registered under the requested name.
    #[error("project {0:?} not found")]
    ProjectNotFound(String),

    /// The backend failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Project lookup and build creation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Looks up a project by its `org/repo` (or bare org) name.
    async fn get_project(&self, name: &str) -> Result<Project, StoreError>;

    /// Persists a new build record.
    async fn create_build(&self, build: &Build) -> Result<(), StoreError>;
}
