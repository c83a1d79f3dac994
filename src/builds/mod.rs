//! Turning classified events into build records.
//!
//! - [`ScriptResolver`] picks the build script: the repository's own file,
//!   else the project's default, else none.
//! - [`BuildFactory`] assembles the [`Build`](crate::types::Build) and hands
//!   it to the store.

pub mod factory;
pub mod script;

pub use factory::{BuildFactory, BuildRequest};
pub use script::{FetchError, FileGetter, ScriptResolver};
