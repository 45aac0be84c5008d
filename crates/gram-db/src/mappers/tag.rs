//! Tag entity <-> model mapper

use gram_core::entities::Tag;
use gram_core::value_objects::Snowflake;

use crate::models::TagModel;

/// Convert TagModel to Tag entity
impl From<TagModel> for Tag {
    fn from(model: TagModel) -> Self {
        Tag {
            id: Snowflake::from_db(model.id),
            post_id: Snowflake::from_db(model.post_id),
            emoji_key: model.emoji_key,
            description: model.description,
            icon_path: model.icon_path,
        }
    }
}

/// Convert Tag entity reference to values for database insertion
pub struct TagInsert<'a> {
    pub id: i64,
    pub post_id: i64,
    pub emoji_key: &'a str,
    pub description: &'a str,
    pub icon_path: Option<&'a str>,
}

impl<'a> TagInsert<'a> {
    pub fn new(tag: &'a Tag) -> Self {
        Self {
            id: tag.id.as_db(),
            post_id: tag.post_id.as_db(),
            emoji_key: &tag.emoji_key,
            description: &tag.description,
            icon_path: tag.icon_path.as_deref(),
        }
    }
}
