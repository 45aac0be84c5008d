//! Entity to model mappers
//!
//! This module provides conversions between domain entities (gram-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert`/`*Upsert` structs: Prepare entity data for database operations

mod post;
mod profile;
mod streak;
mod tag;

pub use post::{AttachmentInsert, PostInsert};
pub use profile::ProfileUpsert;
pub use streak::StreakUpsert;
pub use tag::TagInsert;
