//! Archive store port - transactional persistence for the five entities
//!
//! Every event handler owns exactly one unit of work: `begin` hands out a
//! transaction object, all writes go through it, and the handler either
//! commits or rolls back the whole batch. Reads that need no transactional
//! consistency live on the store itself.

use async_trait::async_trait;

use crate::entities::{Attachment, Post, StreakRecord, Tag, UserProfile};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for archive operations
pub type RepoResult<T> = Result<T, DomainError>;

/// Transactional archive of posts, attachments, profiles, streaks, and tags
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Open a unit of work
    async fn begin(&self) -> RepoResult<Box<dyn ArchiveTx>>;

    /// Find an archived post by id
    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<Post>>;

    /// Find a user's streak record
    async fn find_streak(&self, user_id: Snowflake) -> RepoResult<Option<StreakRecord>>;

    /// Find a mirrored user profile
    async fn find_profile(&self, user_id: Snowflake) -> RepoResult<Option<UserProfile>>;
}

/// One unit of work over the archive
///
/// Dropping a transaction without calling `commit` rolls it back.
#[async_trait]
pub trait ArchiveTx: Send {
    // ------------------------------------------------------------------
    // Posts
    // ------------------------------------------------------------------

    async fn insert_post(&mut self, post: &Post) -> RepoResult<()>;

    async fn find_post(&mut self, id: Snowflake) -> RepoResult<Option<Post>>;

    async fn update_post_content(&mut self, id: Snowflake, content: &str) -> RepoResult<()>;

    /// Delete a post; attachments and tags cascade
    async fn delete_post(&mut self, id: Snowflake) -> RepoResult<()>;

    /// Number of archived posts by an author
    async fn author_post_count(&mut self, author_id: Snowflake) -> RepoResult<i64>;

    // ------------------------------------------------------------------
    // Attachments
    // ------------------------------------------------------------------

    async fn insert_attachment(&mut self, attachment: &Attachment) -> RepoResult<()>;

    /// Attachments of a post, read before replacement or deletion so the
    /// caller can remove the mirrored files afterwards
    async fn attachments_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Attachment>>;

    /// Drop all attachments of a post (wholesale replacement on edit)
    async fn delete_attachments(&mut self, post_id: Snowflake) -> RepoResult<()>;

    // ------------------------------------------------------------------
    // Profiles
    // ------------------------------------------------------------------

    async fn upsert_profile(&mut self, profile: &UserProfile) -> RepoResult<()>;

    async fn delete_profile(&mut self, user_id: Snowflake) -> RepoResult<()>;

    // ------------------------------------------------------------------
    // Streaks
    // ------------------------------------------------------------------

    /// Read a streak record, locking it against concurrent transitions for
    /// the lifetime of this unit of work
    async fn streak_for_update(&mut self, user_id: Snowflake)
        -> RepoResult<Option<StreakRecord>>;

    /// Insert or overwrite a streak record
    async fn put_streak(&mut self, record: &StreakRecord) -> RepoResult<()>;

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    /// Insert a tag if `(post_id, emoji_key)` has none yet; returns whether
    /// a row was actually inserted
    async fn insert_tag(&mut self, tag: &Tag) -> RepoResult<bool>;

    async fn delete_tag(&mut self, post_id: Snowflake, emoji_key: &str) -> RepoResult<()>;

    async fn delete_tags(&mut self, post_id: Snowflake) -> RepoResult<()>;

    async fn tags_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Tag>>;

    // ------------------------------------------------------------------
    // Completion
    // ------------------------------------------------------------------

    async fn commit(self: Box<Self>) -> RepoResult<()>;

    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}
