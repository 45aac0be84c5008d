//! PostgreSQL implementation of the archive store

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use gram_core::entities::{Attachment, Post, StreakRecord, Tag, UserProfile};
use gram_core::traits::{ArchiveStore, ArchiveTx, RepoResult};
use gram_core::value_objects::Snowflake;

use crate::mappers::{AttachmentInsert, PostInsert, ProfileUpsert, StreakUpsert, TagInsert};
use crate::models::{AttachmentModel, PostModel, ProfileModel, StreakModel, TagModel};

use super::error::{map_db_error, post_not_found};

/// PostgreSQL implementation of ArchiveStore
#[derive(Clone)]
pub struct PgArchive {
    pool: PgPool,
}

impl PgArchive {
    /// Create a new PgArchive
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveStore for PgArchive {
    #[instrument(skip(self))]
    async fn begin(&self) -> RepoResult<Box<dyn ArchiveTx>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgArchiveTx { tx }))
    }

    #[instrument(skip(self))]
    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT id, author_id, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.as_db())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self))]
    async fn find_streak(&self, user_id: Snowflake) -> RepoResult<Option<StreakRecord>> {
        let result = sqlx::query_as::<_, StreakModel>(
            r#"
            SELECT user_id, current_streak, max_streak, last_post_date
            FROM streaks
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_db())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(StreakRecord::from))
    }

    #[instrument(skip(self))]
    async fn find_profile(&self, user_id: Snowflake) -> RepoResult<Option<UserProfile>> {
        let result = sqlx::query_as::<_, ProfileModel>(
            r#"
            SELECT user_id, username, display_name, avatar_path, updated_at
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_db())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(UserProfile::from))
    }
}

/// One open PostgreSQL transaction over the archive
pub struct PgArchiveTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ArchiveTx for PgArchiveTx {
    #[instrument(skip(self, post), fields(post_id = %post.id))]
    async fn insert_post(&mut self, post: &Post) -> RepoResult<()> {
        let values = PostInsert::new(post);

        sqlx::query(
            r#"
            INSERT INTO posts (id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(values.id)
        .bind(values.author_id)
        .bind(values.content)
        .bind(values.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_post(&mut self, id: Snowflake) -> RepoResult<Option<Post>> {
        let result = sqlx::query_as::<_, PostModel>(
            r#"
            SELECT id, author_id, content, created_at
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id.as_db())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Post::from))
    }

    #[instrument(skip(self, content))]
    async fn update_post_content(&mut self, id: Snowflake, content: &str) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE posts SET content = $2 WHERE id = $1
            "#,
        )
        .bind(id.as_db())
        .bind(content)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(post_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_post(&mut self, id: Snowflake) -> RepoResult<()> {
        // Attachments and tags cascade; deleting an unknown id is a no-op
        sqlx::query(
            r#"
            DELETE FROM posts WHERE id = $1
            "#,
        )
        .bind(id.as_db())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn author_post_count(&mut self, author_id: Snowflake) -> RepoResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM posts WHERE author_id = $1
            "#,
        )
        .bind(author_id.as_db())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(count)
    }

    #[instrument(skip(self, attachment), fields(attachment_id = %attachment.id))]
    async fn insert_attachment(&mut self, attachment: &Attachment) -> RepoResult<()> {
        let values = AttachmentInsert::new(attachment);

        sqlx::query(
            r#"
            INSERT INTO attachments (id, post_id, path, kind)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(values.id)
        .bind(values.post_id)
        .bind(values.path)
        .bind(values.kind)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn attachments_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Attachment>> {
        let results = sqlx::query_as::<_, AttachmentModel>(
            r#"
            SELECT id, post_id, path, kind
            FROM attachments
            WHERE post_id = $1
            ORDER BY id
            "#,
        )
        .bind(post_id.as_db())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Attachment::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete_attachments(&mut self, post_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM attachments WHERE post_id = $1
            "#,
        )
        .bind(post_id.as_db())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn upsert_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        let values = ProfileUpsert::new(profile);

        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, username, display_name, avatar_path, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id) DO UPDATE
            SET username = EXCLUDED.username,
                display_name = EXCLUDED.display_name,
                avatar_path = EXCLUDED.avatar_path,
                updated_at = NOW()
            "#,
        )
        .bind(values.user_id)
        .bind(values.username)
        .bind(values.display_name)
        .bind(values.avatar_path)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_profile(&mut self, user_id: Snowflake) -> RepoResult<()> {
        // Remaining posts cascade with the profile; the streak row has no
        // foreign key and survives on purpose.
        sqlx::query(
            r#"
            DELETE FROM profiles WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_db())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn streak_for_update(
        &mut self,
        user_id: Snowflake,
    ) -> RepoResult<Option<StreakRecord>> {
        let result = sqlx::query_as::<_, StreakModel>(
            r#"
            SELECT user_id, current_streak, max_streak, last_post_date
            FROM streaks
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id.as_db())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(StreakRecord::from))
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id))]
    async fn put_streak(&mut self, record: &StreakRecord) -> RepoResult<()> {
        let values = StreakUpsert::new(record);

        sqlx::query(
            r#"
            INSERT INTO streaks (user_id, current_streak, max_streak, last_post_date)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET current_streak = EXCLUDED.current_streak,
                max_streak = EXCLUDED.max_streak,
                last_post_date = EXCLUDED.last_post_date
            "#,
        )
        .bind(values.user_id)
        .bind(values.current_streak)
        .bind(values.max_streak)
        .bind(values.last_post_date)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, tag), fields(post_id = %tag.post_id, emoji = %tag.emoji_key))]
    async fn insert_tag(&mut self, tag: &Tag) -> RepoResult<bool> {
        let values = TagInsert::new(tag);

        let result = sqlx::query(
            r#"
            INSERT INTO tags (id, post_id, emoji_key, description, icon_path)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (post_id, emoji_key) DO NOTHING
            "#,
        )
        .bind(values.id)
        .bind(values.post_id)
        .bind(values.emoji_key)
        .bind(values.description)
        .bind(values.icon_path)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_tag(&mut self, post_id: Snowflake, emoji_key: &str) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM tags WHERE post_id = $1 AND emoji_key = $2
            "#,
        )
        .bind(post_id.as_db())
        .bind(emoji_key)
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_tags(&mut self, post_id: Snowflake) -> RepoResult<()> {
        sqlx::query(
            r#"
            DELETE FROM tags WHERE post_id = $1
            "#,
        )
        .bind(post_id.as_db())
        .execute(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn tags_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Tag>> {
        let results = sqlx::query_as::<_, TagModel>(
            r#"
            SELECT id, post_id, emoji_key, description, icon_path
            FROM tags
            WHERE post_id = $1
            ORDER BY id
            "#,
        )
        .bind(post_id.as_db())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Tag::from).collect())
    }

    #[instrument(skip(self))]
    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        self.tx.rollback().await.map_err(map_db_error)
    }
}
