//! Build records handed to the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{ProjectId, Provider};

/// A unit of work derived from one accepted webhook delivery.
///
/// Built once by the build factory, handed to the store and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// The owning project.
    pub project_id: ProjectId,

    /// Canonical event tag, e.g. `push` or `pull_request:labeled`. Never empty.
    #[serde(rename = "type")]
    pub event_type: String,

    /// The provider that sent the delivery.
    pub provider: Provider,

    /// Commit SHA or ref name, depending on the event.
    pub commit: String,

    /// The raw webhook body, exactly as received.
    pub payload: Vec<u8>,

    /// Build script, if one could be resolved.
    pub script: Option<Vec<u8>>,

    /// When the gateway created the record.
    pub created_at: DateTime<Utc>,
}

impl Build {
    /// Returns the script as text, or an empty string when there is none.
    pub fn script_text(&self) -> std::borrow::Cow<'_, str> {
        match &self.script {
            Some(bytes) => String::from_utf8_lossy(bytes),
            None => std::borrow::Cow::Borrowed(""),
        }
    }
}
