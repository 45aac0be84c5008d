//! Archive store implementation
//!
//! PostgreSQL implementation of the `ArchiveStore` and `ArchiveTx` ports
//! defined in gram-core. All event-handler writes flow through one
//! transaction object obtained from `PgArchive::begin`.

mod archive;
mod error;

pub use archive::{PgArchive, PgArchiveTx};
