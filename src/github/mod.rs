//! GitHub API access: scoped octocrab client, commit statuses and the
//! production file getter.

mod client;
mod error;
mod integration;
pub mod status;

pub use client::{OctocrabClient, build_octocrab};
pub use error::GitHubApiError;
pub use integration::GitHubIntegration;
pub use status::{
    MAX_DESCRIPTION_LEN, PENDING_DESCRIPTION, StatusReporter, StatusState, StatusUpdate,
    report_in_background, truncate_at,
};
