//! Ports - interfaces the application layer depends on
//!
//! The domain defines what it needs; infrastructure crates provide the
//! implementations (Postgres for the archive, the platform REST API for
//! outbound actions).

mod archive;
mod platform;

pub use archive::{ArchiveStore, ArchiveTx, RepoResult};
pub use platform::{Platform, PlatformResult, PlatformRole};
