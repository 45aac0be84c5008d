//! Post and Attachment entity <-> model mapper

use chrono::{DateTime, Utc};

use gram_core::entities::{Attachment, AttachmentKind, Post};
use gram_core::value_objects::Snowflake;

use crate::models::{AttachmentModel, PostModel};

/// Convert PostModel to Post entity
impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        Post {
            id: Snowflake::from_db(model.id),
            author_id: Snowflake::from_db(model.author_id),
            content: model.content,
            created_at: model.created_at,
        }
    }
}

/// Convert AttachmentModel to Attachment entity
impl From<AttachmentModel> for Attachment {
    fn from(model: AttachmentModel) -> Self {
        Attachment {
            id: Snowflake::from_db(model.id),
            post_id: Snowflake::from_db(model.post_id),
            path: model.path,
            kind: AttachmentKind::parse(&model.kind),
        }
    }
}

/// Convert Post entity reference to values for database insertion
pub struct PostInsert<'a> {
    pub id: i64,
    pub author_id: i64,
    pub content: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> PostInsert<'a> {
    pub fn new(post: &'a Post) -> Self {
        Self {
            id: post.id.as_db(),
            author_id: post.author_id.as_db(),
            content: &post.content,
            created_at: post.created_at,
        }
    }
}

/// Convert Attachment entity reference to values for database insertion
pub struct AttachmentInsert<'a> {
    pub id: i64,
    pub post_id: i64,
    pub path: &'a str,
    pub kind: &'static str,
}

impl<'a> AttachmentInsert<'a> {
    pub fn new(attachment: &'a Attachment) -> Self {
        Self {
            id: attachment.id.as_db(),
            post_id: attachment.post_id.as_db(),
            path: &attachment.path,
            kind: attachment.kind.as_str(),
        }
    }
}
