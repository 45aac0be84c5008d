//! Database models - SQLx-compatible structs for PostgreSQL tables

mod post;
mod profile;
mod streak;
mod tag;

pub use post::{AttachmentModel, PostModel};
pub use profile::ProfileModel;
pub use streak::StreakModel;
pub use tag::TagModel;
