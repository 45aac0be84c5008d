//! Maps sqlx failures into the domain error type

use gram_core::error::DomainError;
use gram_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Wrap a driver failure; only the driver message survives, never the query.
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Error for statements that matched zero rows of the posts table.
pub fn post_not_found(id: Snowflake) -> DomainError {
    DomainError::PostNotFound(id)
}
