//! Service context - dependency container for all services

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use gram_common::{BotConfig, LevelingConfig, MediaConfig, StorageConfig};
use gram_core::{ArchiveStore, Platform, Snowflake, SnowflakeGenerator};
use gram_media::{BadgeRenderer, Fetcher};

use super::error::{ServiceError, ServiceResult};
use super::rules::TagRules;

/// Shared dependency container handed to every service
///
/// Holds the archive store, the platform client, the media pipeline, and
/// the configuration slices the services need. Cloning is cheap; spawned
/// tasks capture a clone instead of borrowing.
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn ArchiveStore>,
    platform: Arc<dyn Platform>,
    fetcher: Arc<dyn Fetcher>,
    badges: Arc<BadgeRenderer>,
    ids: Arc<SnowflakeGenerator>,
    rules: Arc<TagRules>,
    bot: BotConfig,
    storage: StorageConfig,
    media: MediaConfig,
    leveling: LevelingConfig,
    timezone: Tz,
}

impl ServiceContext {
    #[must_use]
    pub fn store(&self) -> &dyn ArchiveStore {
        self.store.as_ref()
    }

    #[must_use]
    pub fn platform(&self) -> &dyn Platform {
        self.platform.as_ref()
    }

    #[must_use]
    pub fn fetcher(&self) -> &dyn Fetcher {
        self.fetcher.as_ref()
    }

    #[must_use]
    pub fn badges(&self) -> &BadgeRenderer {
        self.badges.as_ref()
    }

    #[must_use]
    pub fn rules(&self) -> &TagRules {
        self.rules.as_ref()
    }

    #[must_use]
    pub fn bot(&self) -> &BotConfig {
        &self.bot
    }

    #[must_use]
    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    #[must_use]
    pub fn media(&self) -> &MediaConfig {
        &self.media
    }

    #[must_use]
    pub fn leveling(&self) -> &LevelingConfig {
        &self.leveling
    }

    #[must_use]
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Mint an id for a locally created row
    #[must_use]
    pub fn generate_id(&self) -> Snowflake {
        self.ids.generate()
    }

    /// The current date in the configured community timezone
    ///
    /// Every streak transition and staleness check uses this date, so a
    /// post at 23:59 and one at 00:01 local time land on different days
    /// regardless of the server clock's zone.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("guild_id", &self.bot.guild_id)
            .field("channel_id", &self.bot.channel_id)
            .field("timezone", &self.timezone)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ServiceContext`]
///
/// Lets the binary wire dependencies in any order and fail with a clear
/// message when one is missing.
#[derive(Default)]
pub struct ServiceContextBuilder {
    store: Option<Arc<dyn ArchiveStore>>,
    platform: Option<Arc<dyn Platform>>,
    fetcher: Option<Arc<dyn Fetcher>>,
    badges: Option<Arc<BadgeRenderer>>,
    ids: Option<Arc<SnowflakeGenerator>>,
    rules: Option<Arc<TagRules>>,
    bot: Option<BotConfig>,
    storage: Option<StorageConfig>,
    media: Option<MediaConfig>,
    leveling: Option<LevelingConfig>,
    timezone: Option<Tz>,
}

impl ServiceContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn ArchiveStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    #[must_use]
    pub fn badges(mut self, badges: Arc<BadgeRenderer>) -> Self {
        self.badges = Some(badges);
        self
    }

    #[must_use]
    pub fn ids(mut self, ids: Arc<SnowflakeGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    #[must_use]
    pub fn rules(mut self, rules: Arc<TagRules>) -> Self {
        self.rules = Some(rules);
        self
    }

    #[must_use]
    pub fn bot(mut self, bot: BotConfig) -> Self {
        self.bot = Some(bot);
        self
    }

    #[must_use]
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn media(mut self, media: MediaConfig) -> Self {
        self.media = Some(media);
        self
    }

    #[must_use]
    pub fn leveling(mut self, leveling: LevelingConfig) -> Self {
        self.leveling = Some(leveling);
        self
    }

    #[must_use]
    pub fn timezone(mut self, timezone: Tz) -> Self {
        self.timezone = Some(timezone);
        self
    }

    /// Build the context
    ///
    /// # Errors
    /// Returns an error naming the first missing dependency
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext {
            store: self
                .store
                .ok_or_else(|| ServiceError::internal("store is required"))?,
            platform: self
                .platform
                .ok_or_else(|| ServiceError::internal("platform is required"))?,
            fetcher: self
                .fetcher
                .ok_or_else(|| ServiceError::internal("fetcher is required"))?,
            badges: self
                .badges
                .ok_or_else(|| ServiceError::internal("badges is required"))?,
            ids: self
                .ids
                .ok_or_else(|| ServiceError::internal("ids is required"))?,
            rules: self
                .rules
                .ok_or_else(|| ServiceError::internal("rules is required"))?,
            bot: self
                .bot
                .ok_or_else(|| ServiceError::internal("bot config is required"))?,
            storage: self
                .storage
                .ok_or_else(|| ServiceError::internal("storage config is required"))?,
            media: self
                .media
                .ok_or_else(|| ServiceError::internal("media config is required"))?,
            leveling: self
                .leveling
                .ok_or_else(|| ServiceError::internal("leveling config is required"))?,
            timezone: self
                .timezone
                .ok_or_else(|| ServiceError::internal("timezone is required"))?,
        })
    }
}

impl std::fmt::Debug for ServiceContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContextBuilder")
            .field("store", &self.store.is_some())
            .field("platform", &self.platform.is_some())
            .field("fetcher", &self.fetcher.is_some())
            .field("badges", &self.badges.is_some())
            .finish_non_exhaustive()
    }
}
