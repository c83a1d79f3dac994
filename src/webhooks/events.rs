//! GitHub event classification.
//!
//! Maps the `X-GitHub-Event` label plus payload fields to the canonical event
//! tag stored as a build's type, and picks the commit or ref the build runs
//! against.
//!
//! # Event Types
//!
//! | Event | Commit | Qualifying actions | Status update |
//! |-------|--------|--------------------|---------------|
//! | `push` | `head_commit.id` | - | yes |
//! | `pull_request` | `pull_request.head.sha` | `labeled`, `unlabeled` | yes |
//! | `pull_request_review` | `pull_request.head.sha` | - | yes |
//! | `status` | `sha` | - | yes |
//! | `release` | `release.tag_name` | - | no |
//! | `create` | `ref` | - | no |
//! | `commit_comment` | `comment.commit_id` | - | yes |
//! | `deployment` | `deployment.sha` | - | yes |
//! | `deployment_status` | `deployment.sha` | - | yes |
//!
//! `ping` is answered without a build. Any other label is ignored (accepted,
//! no build). Supporting a new event means adding a row to [`EVENT_RULES`].

use super::parser::{
    EventDetails, ParseError, parse_commit_comment, parse_create, parse_deployment,
    parse_pull_request, parse_push, parse_release, parse_status,
};

/// Label GitHub sends when a hook is first configured.
pub const PING_EVENT: &str = "ping";

/// One row of the classification table.
pub struct EventRule {
    /// The `X-GitHub-Event` label.
    pub name: &'static str,

    /// Pulls the commit/ref and action out of the payload.
    pub extract: fn(&[u8]) -> Result<EventDetails, ParseError>,

    /// Payload actions that qualify the tag as `<name>:<action>`.
    pub qualifying_actions: &'static [&'static str],

    /// Whether the event names a commit SHA that can carry a status.
    pub commit_bearing: bool,
}

impl std::fmt::Debug for EventRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRule")
            .field("name", &self.name)
            .field("qualifying_actions", &self.qualifying_actions)
            .field("commit_bearing", &self.commit_bearing)
            .finish_non_exhaustive()
    }
}

/// The supported GitHub events.
pub static EVENT_RULES: &[EventRule] = &[
    EventRule {
        name: "push",
        extract: parse_push,
        qualifying_actions: &[],
        commit_bearing: true,
    },
    EventRule {
        name: "pull_request",
        extract: parse_pull_request,
        qualifying_actions: &["labeled", "unlabeled"],
        commit_bearing: true,
    },
    EventRule {
        name: "pull_request_review",
        extract: parse_pull_request,
        qualifying_actions: &[],
        commit_bearing: true,
    },
    EventRule {
        name: "status",
        extract: parse_status,
        qualifying_actions: &[],
        commit_bearing: true,
    },
    EventRule {
        name: "release",
        extract: parse_release,
        qualifying_actions: &[],
        commit_bearing: false,
    },
    EventRule {
        name: "create",
        extract: parse_create,
        qualifying_actions: &[],
        commit_bearing: false,
    },
    EventRule {
        name: "commit_comment",
        extract: parse_commit_comment,
        qualifying_actions: &[],
        commit_bearing: true,
    },
    EventRule {
        name: "deployment",
        extract: parse_deployment,
        qualifying_actions: &[],
        commit_bearing: true,
    },
    EventRule {
        name: "deployment_status",
        extract: parse_deployment,
        qualifying_actions: &[],
        commit_bearing: true,
    },
];

/// How a delivery's event label is routed, decided before the body is read.
#[derive(Debug, Clone, Copy)]
pub enum EventRoute {
    /// Connectivity check; always succeeds without a build.
    Ping,

    /// A label with no rule; accepted and ignored.
    Unsupported,

    /// A label with a classification rule.
    Supported(&'static EventRule),
}

/// Looks up the route for an event label.
pub fn route_event(label: &str) -> EventRoute {
    if label == PING_EVENT {
        return EventRoute::Ping;
    }
    EVENT_RULES
        .iter()
        .find(|rule| rule.name == label)
        .map_or(EventRoute::Unsupported, EventRoute::Supported)
}

/// A classified event ready to become a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    /// Canonical tag, possibly qualified by action.
    pub event_type: String,

    /// Commit SHA or ref name.
    pub commit: String,

    /// Whether a status update should be posted for `commit`.
    pub commit_bearing: bool,
}

/// Result of classifying a supported event's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Build this event.
    Build(ClassifiedEvent),

    /// A push that deleted its branch; nothing to build.
    BranchDeleted,
}

impl EventRule {
    /// Classifies a payload under this rule.
    pub fn classify(&self, payload: &[u8]) -> Result<Classification, ParseError> {
        let details = (self.extract)(payload)?;
        if details.deleted {
            return Ok(Classification::BranchDeleted);
        }

        Ok(Classification::Build(ClassifiedEvent {
            event_type: self.event_type(details.action.as_deref()),
            commit: details.commit,
            commit_bearing: self.commit_bearing,
        }))
    }

    /// Returns the canonical tag for a payload action.
    pub fn event_type(&self, action: Option<&str>) -> String {
        match action {
            Some(action) if self.qualifying_actions.contains(&action) => {
                format!("{}:{}", self.name, action)
            }
            _ => self.name.to_string(),
        }
    }
}
