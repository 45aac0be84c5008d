//! Post entity - an accepted submission in the moderated channel

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Post entity
///
/// `content` holds the rendered form of the submission text; the raw
/// platform markup is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Snowflake,
    pub author_id: Snowflake,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post with the platform-supplied creation time
    pub fn new(
        id: Snowflake,
        author_id: Snowflake,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author_id,
            content,
            created_at,
        }
    }

}
