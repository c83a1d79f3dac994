//! Webhook handling for GitHub events.
//!
//! This module provides:
//! - Signature verification for webhook payloads (HMAC-SHA1)
//! - The event classification table and payload field extraction

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{
    Classification, ClassifiedEvent, EVENT_RULES, EventRoute, EventRule, PING_EVENT, route_event,
};
pub use parser::{EventDetails, ParseError, repository_full_name};
pub use signature::{
    compute_signature, format_signature_header, parse_signature_header, sign_payload,
    verify_signature,
};
