//! # gram-db
//!
//! PostgreSQL implementation of the archive ports from `gram-core`.
//!
//! [`PgArchive`] hands out one [`PgArchiveTx`] per unit of work. Rows are
//! plain `FromRow` structs under [`models`], converted by [`mappers`], and
//! the schema is provisioned at startup by [`pool::ensure_schema`].
//!
//! ```rust,ignore
//! let pool = gram_db::create_pool(&config.database).await?;
//! gram_db::ensure_schema(&pool).await?;
//! let archive = PgArchive::new(pool);
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, ensure_schema, PgPool};
pub use repositories::{PgArchive, PgArchiveTx};
