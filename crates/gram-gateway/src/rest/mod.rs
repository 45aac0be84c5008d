//! Platform REST adapter
//!
//! Implements the `Platform` port over the platform's HTTP API.

mod platform;
mod types;

pub use platform::HttpPlatform;
pub use types::{RestChannel, RestMessage, RestReaction, RestRole};
