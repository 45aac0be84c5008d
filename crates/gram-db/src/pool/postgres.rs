//! PostgreSQL connection pool management and schema provisioning

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use gram_common::DatabaseConfig;

/// Maximum time to wait for a connection
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum idle time before a connection is closed
const IDLE_TIMEOUT: Duration = Duration::from_secs(300);
/// Maximum lifetime of a connection
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .connect(&config.url)
        .await
}

/// Create the archive tables when they do not exist yet
///
/// Runs at startup so a fresh database needs no manual provisioning.
/// Every statement is idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    const STATEMENTS: &[&str] = &[
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            user_id      BIGINT PRIMARY KEY,
            username     TEXT NOT NULL,
            display_name TEXT NOT NULL,
            avatar_path  TEXT,
            updated_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id         BIGINT PRIMARY KEY,
            author_id  BIGINT NOT NULL REFERENCES profiles(user_id) ON DELETE CASCADE,
            content    TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS attachments (
            id      BIGINT PRIMARY KEY,
            post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            path    TEXT NOT NULL,
            kind    TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id          BIGINT PRIMARY KEY,
            post_id     BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            emoji_key   TEXT NOT NULL,
            description TEXT NOT NULL,
            icon_path   TEXT,
            UNIQUE (post_id, emoji_key)
        )
        "#,
        // No foreign key: streak history outlives the profile row, which is
        // dropped once an author has no posts left.
        r#"
        CREATE TABLE IF NOT EXISTS streaks (
            user_id        BIGINT PRIMARY KEY,
            current_streak INT NOT NULL,
            max_streak     INT NOT NULL,
            last_post_date DATE NOT NULL
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id)",
        "CREATE INDEX IF NOT EXISTS idx_attachments_post ON attachments(post_id)",
        "CREATE INDEX IF NOT EXISTS idx_tags_post ON tags(post_id)",
    ];

    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}
