//! # gram-service
//!
//! Application layer of the archive bot. Each service owns one use case
//! and orchestrates the archive store, the media pipeline, and the
//! platform API behind a [`services::ServiceContext`]:
//!
//! - [`services::post`] - submission ingestion, edits, deletions, and the
//!   post-commit announcements
//! - [`services::tag`] - reaction-driven tag lifecycle and keyword
//!   auto-reactions
//! - [`services::level`] - streak level roles and their rendered badges
//! - [`services::profile`] - member profile and avatar mirroring
//! - [`services::reconcile`] - the daily pass revoking stale streak roles
//!
//! Services hold no state of their own; everything flows through the
//! context so the gateway can hand one handle to every handler.

pub mod services;

pub use services::{ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult};
