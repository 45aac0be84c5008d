//! Test doubles and the pipeline test world
//!
//! `MemoryArchive` gives the services real transaction semantics over
//! plain maps, `RecordingPlatform` captures every outbound platform call,
//! and `TestWorld` wires both into a service context and a router.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use gram_common::{LevelingConfig, MediaConfig, StorageConfig};
use gram_core::events::GatewayEvent;
use gram_core::{
    ArchiveStore, ArchiveTx, Attachment, DomainError, ExtensionPolicy, MemberIdentity, Platform,
    PlatformResult, PlatformRole, Post, RepoResult, Snowflake, SnowflakeGenerator, StreakRecord,
    Tag, UserProfile,
};
use gram_gateway::EventRouter;
use gram_media::{BadgeRenderer, Fetcher, MediaError};
use gram_service::services::TagRules;
use gram_service::{ServiceContext, ServiceContextBuilder};

use crate::fixtures;

// ---------------------------------------------------------------------
// In-memory archive
// ---------------------------------------------------------------------

/// The five entity tables of the archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveState {
    pub posts: HashMap<Snowflake, Post>,
    pub attachments: HashMap<Snowflake, Vec<Attachment>>,
    pub profiles: HashMap<Snowflake, UserProfile>,
    pub streaks: HashMap<Snowflake, StreakRecord>,
    pub tags: HashMap<Snowflake, Vec<Tag>>,
}

/// Map-backed [`ArchiveStore`] with snapshot transactions
///
/// `begin` clones the committed state; writes mutate the clone and only
/// `commit` publishes it, so a rolled-back or failed unit of work leaves
/// the visible archive untouched, exactly like the real store.
#[derive(Default)]
pub struct MemoryArchive {
    state: Arc<Mutex<ArchiveState>>,
    fail_commits: AtomicBool,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the committed state for assertions
    pub fn state(&self) -> ArchiveState {
        self.state.lock().clone()
    }

    /// Refuse every commit from now on
    pub fn fail_commits(&self) {
        self.fail_commits.store(true, Ordering::SeqCst);
    }

    /// Put a streak record in place without going through a post
    pub fn seed_streak(&self, record: StreakRecord) {
        self.state.lock().streaks.insert(record.user_id, record);
    }

    /// Put a profile row in place without going through a post
    pub fn seed_profile(&self, profile: UserProfile) {
        self.state.lock().profiles.insert(profile.id, profile);
    }
}

struct MemoryTx {
    work: ArchiveState,
    shared: Arc<Mutex<ArchiveState>>,
    fail_commit: bool,
}

#[async_trait]
impl ArchiveStore for MemoryArchive {
    async fn begin(&self) -> RepoResult<Box<dyn ArchiveTx>> {
        Ok(Box::new(MemoryTx {
            work: self.state.lock().clone(),
            shared: Arc::clone(&self.state),
            fail_commit: self.fail_commits.load(Ordering::SeqCst),
        }))
    }

    async fn find_post(&self, id: Snowflake) -> RepoResult<Option<Post>> {
        Ok(self.state.lock().posts.get(&id).cloned())
    }

    async fn find_streak(&self, user_id: Snowflake) -> RepoResult<Option<StreakRecord>> {
        Ok(self.state.lock().streaks.get(&user_id).copied())
    }

    async fn find_profile(&self, user_id: Snowflake) -> RepoResult<Option<UserProfile>> {
        Ok(self.state.lock().profiles.get(&user_id).cloned())
    }
}

#[async_trait]
impl ArchiveTx for MemoryTx {
    async fn insert_post(&mut self, post: &Post) -> RepoResult<()> {
        if self.work.posts.contains_key(&post.id) {
            return Err(DomainError::DatabaseError(format!(
                "duplicate post {}",
                post.id
            )));
        }
        self.work.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_post(&mut self, id: Snowflake) -> RepoResult<Option<Post>> {
        Ok(self.work.posts.get(&id).cloned())
    }

    async fn update_post_content(&mut self, id: Snowflake, content: &str) -> RepoResult<()> {
        match self.work.posts.get_mut(&id) {
            Some(post) => {
                post.content = content.to_string();
                Ok(())
            }
            None => Err(DomainError::PostNotFound(id)),
        }
    }

    async fn delete_post(&mut self, id: Snowflake) -> RepoResult<()> {
        self.work.posts.remove(&id);
        self.work.attachments.remove(&id);
        self.work.tags.remove(&id);
        Ok(())
    }

    async fn author_post_count(&mut self, author_id: Snowflake) -> RepoResult<i64> {
        let count = self
            .work
            .posts
            .values()
            .filter(|post| post.author_id == author_id)
            .count();
        Ok(count as i64)
    }

    async fn insert_attachment(&mut self, attachment: &Attachment) -> RepoResult<()> {
        self.work
            .attachments
            .entry(attachment.post_id)
            .or_default()
            .push(attachment.clone());
        Ok(())
    }

    async fn attachments_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Attachment>> {
        Ok(self.work.attachments.get(&post_id).cloned().unwrap_or_default())
    }

    async fn delete_attachments(&mut self, post_id: Snowflake) -> RepoResult<()> {
        self.work.attachments.remove(&post_id);
        Ok(())
    }

    async fn upsert_profile(&mut self, profile: &UserProfile) -> RepoResult<()> {
        self.work.profiles.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn delete_profile(&mut self, user_id: Snowflake) -> RepoResult<()> {
        self.work.profiles.remove(&user_id);
        Ok(())
    }

    async fn streak_for_update(
        &mut self,
        user_id: Snowflake,
    ) -> RepoResult<Option<StreakRecord>> {
        // The router serializes per-user work, so the row lock of the real
        // store has nothing to do here
        Ok(self.work.streaks.get(&user_id).copied())
    }

    async fn put_streak(&mut self, record: &StreakRecord) -> RepoResult<()> {
        self.work.streaks.insert(record.user_id, *record);
        Ok(())
    }

    async fn insert_tag(&mut self, tag: &Tag) -> RepoResult<bool> {
        let tags = self.work.tags.entry(tag.post_id).or_default();
        if tags.iter().any(|existing| existing.emoji_key == tag.emoji_key) {
            return Ok(false);
        }
        tags.push(tag.clone());
        Ok(true)
    }

    async fn delete_tag(&mut self, post_id: Snowflake, emoji_key: &str) -> RepoResult<()> {
        if let Some(tags) = self.work.tags.get_mut(&post_id) {
            tags.retain(|tag| tag.emoji_key != emoji_key);
        }
        Ok(())
    }

    async fn delete_tags(&mut self, post_id: Snowflake) -> RepoResult<()> {
        self.work.tags.remove(&post_id);
        Ok(())
    }

    async fn tags_for_post(&mut self, post_id: Snowflake) -> RepoResult<Vec<Tag>> {
        Ok(self.work.tags.get(&post_id).cloned().unwrap_or_default())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        if self.fail_commit {
            return Err(DomainError::DatabaseError("commit refused".to_string()));
        }
        *self.shared.lock() = self.work;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Recording platform
// ---------------------------------------------------------------------

/// One outbound platform action, in call order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    DeletePost {
        channel_id: Snowflake,
        post_id: Snowflake,
    },
    DirectMessage {
        user_id: Snowflake,
        content: String,
    },
    CreateThread {
        post_id: Snowflake,
        title: String,
    },
    ThreadMessage {
        thread_id: Snowflake,
        content: String,
    },
    AddReaction {
        post_id: Snowflake,
        emoji: String,
    },
    RemoveReaction {
        post_id: Snowflake,
        emoji: String,
    },
    CreateRole {
        name: String,
        with_icon: bool,
    },
    DeleteRole {
        role_id: Snowflake,
    },
    AssignRole {
        user_id: Snowflake,
        role_id: Snowflake,
    },
    UnassignRole {
        user_id: Snowflake,
        role_id: Snowflake,
    },
}

/// [`Platform`] fake that records calls and keeps just enough guild state
/// (roles, role membership, the bot's own reactions) for the services'
/// read-backs to behave
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    roles: Mutex<Vec<PlatformRole>>,
    role_members: Mutex<HashMap<Snowflake, HashSet<Snowflake>>>,
    bot_reactions: Mutex<HashMap<Snowflake, Vec<String>>>,
    members: Mutex<Vec<MemberIdentity>>,
    next_id: AtomicU64,
    fail_threads: AtomicBool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            roles: Mutex::new(Vec::new()),
            role_members: Mutex::new(HashMap::new()),
            bot_reactions: Mutex::new(HashMap::new()),
            members: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(9000),
            fail_threads: AtomicBool::new(false),
        }
    }

    fn record(&self, call: PlatformCall) {
        self.calls.lock().push(call);
    }

    fn next(&self) -> Snowflake {
        Snowflake::new(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }

    /// Contents of the direct messages sent so far
    pub fn direct_messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::DirectMessage { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Contents of the thread messages sent so far
    pub fn thread_messages(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::ThreadMessage { content, .. } => Some(content.clone()),
                _ => None,
            })
            .collect()
    }

    /// Emojis added as reactions, in order
    pub fn added_reactions(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::AddReaction { emoji, .. } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }

    /// Emojis removed again, in order
    pub fn removed_reactions(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::RemoveReaction { emoji, .. } => Some(emoji.clone()),
                _ => None,
            })
            .collect()
    }

    /// How many discussion threads were opened
    pub fn threads_created(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| matches!(call, PlatformCall::CreateThread { .. }))
            .count()
    }

    /// Posts deleted from the channel
    pub fn deleted_posts(&self) -> Vec<Snowflake> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::DeletePost { post_id, .. } => Some(*post_id),
                _ => None,
            })
            .collect()
    }

    /// Roles created, as (name, had icon) pairs
    pub fn created_roles(&self) -> Vec<(String, bool)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::CreateRole { name, with_icon } => {
                    Some((name.clone(), *with_icon))
                }
                _ => None,
            })
            .collect()
    }

    /// Roles deleted outright
    pub fn deleted_roles(&self) -> Vec<Snowflake> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::DeleteRole { role_id } => Some(*role_id),
                _ => None,
            })
            .collect()
    }

    /// (user, role) assignment pairs
    pub fn assigned_roles(&self) -> Vec<(Snowflake, Snowflake)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::AssignRole { user_id, role_id } => Some((*user_id, *role_id)),
                _ => None,
            })
            .collect()
    }

    /// (user, role) unassignment pairs
    pub fn unassigned_roles(&self) -> Vec<(Snowflake, Snowflake)> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                PlatformCall::UnassignRole { user_id, role_id } => Some((*user_id, *role_id)),
                _ => None,
            })
            .collect()
    }

    /// Put a guild role in place, as if created before the test
    pub fn seed_role(&self, id: u64, name: &str) -> PlatformRole {
        let role = PlatformRole {
            id: Snowflake::new(id),
            name: name.to_string(),
        };
        self.roles.lock().push(role.clone());
        role
    }

    /// Mark a member as holding a role, without recording a call
    pub fn grant_role(&self, role_id: Snowflake, user_id: Snowflake) {
        self.role_members
            .lock()
            .entry(role_id)
            .or_default()
            .insert(user_id);
    }

    /// Set the guild member list served by `fetch_members`
    pub fn seed_members(&self, members: Vec<MemberIdentity>) {
        *self.members.lock() = members;
    }

    /// Refuse every thread creation from now on
    pub fn fail_threads(&self) {
        self.fail_threads.store(true, Ordering::SeqCst);
    }
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Platform for RecordingPlatform {
    async fn delete_post(&self, channel_id: Snowflake, post_id: Snowflake) -> PlatformResult<()> {
        self.record(PlatformCall::DeletePost {
            channel_id,
            post_id,
        });
        Ok(())
    }

    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()> {
        self.record(PlatformCall::DirectMessage {
            user_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn create_thread(
        &self,
        _channel_id: Snowflake,
        post_id: Snowflake,
        title: &str,
    ) -> PlatformResult<Snowflake> {
        if self.fail_threads.load(Ordering::SeqCst) {
            return Err(DomainError::PlatformError("thread refused".to_string()));
        }
        self.record(PlatformCall::CreateThread {
            post_id,
            title: title.to_string(),
        });
        Ok(self.next())
    }

    async fn send_threaded_message(
        &self,
        thread_id: Snowflake,
        content: &str,
    ) -> PlatformResult<()> {
        self.record(PlatformCall::ThreadMessage {
            thread_id,
            content: content.to_string(),
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.record(PlatformCall::AddReaction {
            post_id,
            emoji: emoji.to_string(),
        });
        let mut reactions = self.bot_reactions.lock();
        let own = reactions.entry(post_id).or_default();
        if !own.iter().any(|existing| existing == emoji) {
            own.push(emoji.to_string());
        }
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.record(PlatformCall::RemoveReaction {
            post_id,
            emoji: emoji.to_string(),
        });
        if let Some(own) = self.bot_reactions.lock().get_mut(&post_id) {
            own.retain(|existing| existing != emoji);
        }
        Ok(())
    }

    async fn own_reactions(
        &self,
        _channel_id: Snowflake,
        post_id: Snowflake,
    ) -> PlatformResult<Vec<String>> {
        Ok(self
            .bot_reactions
            .lock()
            .get(&post_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn guild_roles(&self) -> PlatformResult<Vec<PlatformRole>> {
        Ok(self.roles.lock().clone())
    }

    async fn create_role(
        &self,
        name: &str,
        icon_png: Option<&[u8]>,
    ) -> PlatformResult<PlatformRole> {
        self.record(PlatformCall::CreateRole {
            name: name.to_string(),
            with_icon: icon_png.is_some(),
        });
        let role = PlatformRole {
            id: self.next(),
            name: name.to_string(),
        };
        self.roles.lock().push(role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role_id: Snowflake) -> PlatformResult<()> {
        self.record(PlatformCall::DeleteRole { role_id });
        self.roles.lock().retain(|role| role.id != role_id);
        self.role_members.lock().remove(&role_id);
        Ok(())
    }

    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()> {
        self.record(PlatformCall::AssignRole { user_id, role_id });
        self.role_members
            .lock()
            .entry(role_id)
            .or_default()
            .insert(user_id);
        Ok(())
    }

    async fn unassign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()> {
        self.record(PlatformCall::UnassignRole { user_id, role_id });
        if let Some(holders) = self.role_members.lock().get_mut(&role_id) {
            holders.remove(&user_id);
        }
        Ok(())
    }

    async fn role_member_count(&self, role_id: Snowflake) -> PlatformResult<usize> {
        Ok(self
            .role_members
            .lock()
            .get(&role_id)
            .map_or(0, HashSet::len))
    }

    async fn fetch_members(&self) -> PlatformResult<Vec<MemberIdentity>> {
        Ok(self.members.lock().clone())
    }
}

// ---------------------------------------------------------------------
// Fetch stand-in
// ---------------------------------------------------------------------

/// What the fake fetcher does with a mirror request
#[derive(Debug, Clone, Copy)]
pub enum FetchMode {
    /// Write a small marker file, so deletion behavior shows up on disk
    Mirror,
    /// Report every source unreachable
    Unreachable,
}

pub struct FakeFetcher {
    mode: FetchMode,
}

impl FakeFetcher {
    pub fn new(mode: FetchMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn mirror(&self, _url: &str, dest: &Path) -> Result<bool, MediaError> {
        match self.mode {
            FetchMode::Unreachable => Ok(false),
            FetchMode::Mirror => {
                if let Some(parent) = dest.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(dest, b"mirrored").await?;
                Ok(true)
            }
        }
    }
}

// ---------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------

/// A fully wired pipeline over the fakes
pub struct TestWorld {
    pub ctx: ServiceContext,
    pub router: EventRouter,
    pub archive: Arc<MemoryArchive>,
    pub platform: Arc<RecordingPlatform>,
    pub data_dir: PathBuf,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::build("", FetchMode::Mirror)
    }

    /// World with keyword auto-tag rules, in `pattern=emoji` lines form
    pub fn with_rules(rules: &str) -> Self {
        Self::build(rules, FetchMode::Mirror)
    }

    /// World where every attachment and avatar source is unreachable
    pub fn unreachable_sources() -> Self {
        Self::build("", FetchMode::Unreachable)
    }

    fn build(rules: &str, fetch: FetchMode) -> Self {
        let data_dir =
            std::env::temp_dir().join(format!("gram-it-{}", fixtures::unique_suffix()));

        let archive = Arc::new(MemoryArchive::new());
        let platform = Arc::new(RecordingPlatform::new());

        let storage = StorageConfig {
            attachments_dir: path_string(&data_dir, "attachments"),
            avatars_dir: path_string(&data_dir, "avatars"),
            emoji_dir: path_string(&data_dir, "emoji"),
            levels_dir: path_string(&data_dir, "levels"),
        };
        let media = MediaConfig {
            // Missing on purpose: badge rendering degrades to icon-less roles
            font_file: path_string(&data_dir, "font.ttf"),
            level_template: path_string(&data_dir, "level-template.png"),
            ffmpeg_path: "ffmpeg".to_string(),
            extensions: ExtensionPolicy::new(
                vec!["png".to_string(), "jpg".to_string()],
                vec!["mp4".to_string()],
                vec!["mp3".to_string()],
            ),
        };
        let badges =
            BadgeRenderer::new(&media.level_template, &media.font_file, &storage.levels_dir)
                .expect("badge output dir");

        let ctx = ServiceContextBuilder::new()
            .store(archive.clone())
            .platform(platform.clone())
            .fetcher(Arc::new(FakeFetcher::new(fetch)))
            .badges(Arc::new(badges))
            .ids(Arc::new(SnowflakeGenerator::new(1)))
            .rules(Arc::new(TagRules::parse(rules)))
            .bot(fixtures::bot_config())
            .storage(storage)
            .media(media)
            .leveling(LevelingConfig {
                role_prefix: "niveau".to_string(),
            })
            .timezone(chrono_tz::UTC)
            .build()
            .expect("context over fakes");

        let router = EventRouter::new(ctx.clone());

        Self {
            ctx,
            router,
            archive,
            platform,
            data_dir,
        }
    }

    /// The pipeline's idea of today
    pub fn today(&self) -> NaiveDate {
        self.ctx.today()
    }

    /// Drive one event through the router, as the gateway would
    pub async fn handle(&self, event: GatewayEvent) {
        self.router.handle(event).await;
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn path_string(base: &Path, leaf: &str) -> String {
    base.join(leaf).to_string_lossy().into_owned()
}
