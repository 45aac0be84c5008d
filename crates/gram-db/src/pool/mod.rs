//! Pool construction and schema provisioning

mod postgres;

pub use postgres::{create_pool, ensure_schema};
pub use sqlx::postgres::PgPool;
