//! Tag lifecycle service
//!
//! Reactions on archived posts become tag rows keyed by emoji; removals,
//! per-emoji clears, and full clears take them away again. The reserved
//! status emojis never become tags. The service also applies the keyword
//! auto-reactions whose echoes feed back into this same lifecycle.

use std::path::Path;

use gram_core::{is_reserved_emoji, parse_custom_emoji, Snowflake, Tag};
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Mirrors reaction state on archived posts into tag rows
pub struct TagService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TagService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Record a tag for a freshly added reaction
    ///
    /// Idempotent across reactors: the first reaction of an emoji creates
    /// the tag, later ones find it in place. Reactions on posts the
    /// archive never accepted are ignored.
    #[instrument(skip(self, post_id), fields(post_id = %post_id))]
    pub async fn reaction_added(&self, post_id: Snowflake, emoji: &str) -> ServiceResult<()> {
        if is_reserved_emoji(emoji) {
            return Ok(());
        }
        if self.ctx.store().find_post(post_id).await?.is_none() {
            debug!("Reaction on unarchived post, ignoring");
            return Ok(());
        }

        let (description, icon_path) = self.describe(emoji).await;
        let tag = Tag::new(
            self.ctx.generate_id(),
            post_id,
            emoji.to_string(),
            description,
            icon_path,
        );

        let mut tx = self.ctx.store().begin().await?;
        let inserted = tx.insert_tag(&tag).await?;
        tx.commit().await?;

        if inserted {
            info!("Tag recorded");
        }
        Ok(())
    }

    /// Drop the tag once the platform reports nobody holds the emoji
    ///
    /// `remaining` is the count the platform reports after this removal;
    /// the tag stays while other members still react with the emoji.
    #[instrument(skip(self, post_id), fields(post_id = %post_id))]
    pub async fn reaction_removed(
        &self,
        post_id: Snowflake,
        emoji: &str,
        remaining: i64,
    ) -> ServiceResult<()> {
        if is_reserved_emoji(emoji) || remaining > 0 {
            return Ok(());
        }

        let mut tx = self.ctx.store().begin().await?;
        tx.delete_tag(post_id, emoji).await?;
        tx.commit().await?;

        debug!("Tag removed");
        Ok(())
    }

    /// A moderator cleared one emoji outright; the tag goes with it
    #[instrument(skip(self, post_id), fields(post_id = %post_id))]
    pub async fn reaction_cleared(&self, post_id: Snowflake, emoji: &str) -> ServiceResult<()> {
        if is_reserved_emoji(emoji) {
            return Ok(());
        }

        let mut tx = self.ctx.store().begin().await?;
        tx.delete_tag(post_id, emoji).await?;
        tx.commit().await?;

        debug!("Tag removed on clear");
        Ok(())
    }

    /// All reactions cleared; every tag on the post goes
    #[instrument(skip(self, post_id), fields(post_id = %post_id))]
    pub async fn reactions_cleared_all(&self, post_id: Snowflake) -> ServiceResult<()> {
        let mut tx = self.ctx.store().begin().await?;
        tx.delete_tags(post_id).await?;
        tx.commit().await?;

        debug!("All tags removed");
        Ok(())
    }

    /// React with every keyword-mapped emoji the content matches
    ///
    /// Only reactions are applied here; the tag rows arrive through the
    /// echoed reaction events like any member reaction would.
    pub async fn apply_auto_reactions(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        content: &str,
    ) -> ServiceResult<()> {
        for emoji in self.ctx.rules().matches(content) {
            self.ctx
                .platform()
                .add_reaction(channel_id, post_id, emoji)
                .await?;
        }
        Ok(())
    }

    /// Remove the bot's own reactions whose keyword no longer matches
    ///
    /// Runs on edit before re-applying the current matches. The reserved
    /// status emojis are exempt from the sweep.
    pub async fn sweep_stale_reactions(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        content: &str,
    ) -> ServiceResult<()> {
        let own = self.ctx.platform().own_reactions(channel_id, post_id).await?;
        if own.is_empty() {
            return Ok(());
        }

        let matched = self.ctx.rules().matches(content);
        for emoji in &own {
            if is_reserved_emoji(emoji) || matched.contains(&emoji.as_str()) {
                continue;
            }
            self.ctx
                .platform()
                .remove_reaction(channel_id, post_id, emoji)
                .await?;
        }
        Ok(())
    }

    /// Description and cached icon for an emoji key
    ///
    /// Custom emojis keep their name and get their image mirrored from
    /// the platform CDN; unicode emojis get a readable name and no icon.
    async fn describe(&self, emoji: &str) -> (String, Option<String>) {
        match parse_custom_emoji(emoji) {
            Some(custom) => {
                let icon_path = self.mirror_emoji_icon(custom.id).await;
                (custom.name.replace('_', " "), icon_path)
            }
            None => (standard_emoji_name(emoji), None),
        }
    }

    /// Cache a custom emoji's image, returning the local path when the
    /// file is available
    ///
    /// The icon is shared by every tag using the emoji, so an existing
    /// file is never refetched. A failed fetch leaves the tag icon-less.
    async fn mirror_emoji_icon(&self, emoji_id: Snowflake) -> Option<String> {
        let path = Path::new(&self.ctx.storage().emoji_dir).join(format!("{emoji_id}.png"));
        if path.exists() {
            return Some(path.to_string_lossy().into_owned());
        }

        let url = format!("{}/emojis/{emoji_id}.png", self.ctx.bot().cdn_base);
        match self.ctx.fetcher().mirror(&url, &path).await {
            Ok(true) => Some(path.to_string_lossy().into_owned()),
            Ok(false) => {
                warn!(%emoji_id, "Emoji icon unavailable");
                None
            }
            Err(error) => {
                warn!(%emoji_id, %error, "Emoji icon fetch failed");
                None
            }
        }
    }
}

/// Readable name of a unicode emoji, separators flattened to spaces
///
/// Falls back to the emoji itself for sequences the table does not know.
fn standard_emoji_name(emoji: &str) -> String {
    match emojis::get(emoji) {
        Some(entry) => entry.name().replace(['-', '_', ':'], " "),
        None => emoji.to_string(),
    }
}
