//! The error type shared by the domain ports.
//!
//! Both ports funnel their failures through here: the archive store
//! wraps driver errors as [`DomainError::DatabaseError`] and the
//! platform client wraps HTTP failures as [`DomainError::PlatformError`].
//! The one structured variant is [`DomainError::PostNotFound`], raised
//! when an operation targets a post the archive never stored or has
//! already scrubbed.

use thiserror::Error;

use crate::value_objects::Snowflake;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Post not found: {0}")]
    PostNotFound(Snowflake),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Platform error: {0}")]
    PlatformError(String),
}

impl DomainError {
    /// Stable code for structured log fields.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::PlatformError(_) => "PLATFORM_ERROR",
        }
    }

    /// True when the failure is a missing record rather than a broken store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PostNotFound(_))
    }
}
