//! Test doubles and fixtures for driving the full bot pipeline
//!
//! An in-memory archive with real transaction semantics, a platform fake
//! that records every outbound call, and builders for gateway events, so
//! scenario tests run the router end to end without Postgres or a socket.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
