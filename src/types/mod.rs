//! Core domain types for the build gateway.
//!
//! Projects are read-only configuration owned by the store; builds are the
//! work items this crate produces from accepted webhook deliveries.

pub mod build;
pub mod ids;
pub mod project;

// Re-export commonly used types at the module level
pub use build::Build;
pub use ids::{ProjectId, Provider, RepoId};
pub use project::{Project, RepoConfig};
