//! Tag database model

use sqlx::FromRow;

/// Database model for the tags table
#[derive(Debug, Clone, FromRow)]
pub struct TagModel {
    pub id: i64,
    pub post_id: i64,
    pub emoji_key: String,
    pub description: String,
    pub icon_path: Option<String>,
}
