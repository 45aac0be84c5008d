//! Platform port - outbound actions against the chat platform
//!
//! Handlers never talk to the platform API directly; they go through this
//! trait so the whole pipeline can run against a recording fake in tests.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::events::MemberIdentity;
use crate::value_objects::Snowflake;

/// Result type for platform actions
pub type PlatformResult<T> = Result<T, DomainError>;

/// A guild role as known to the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRole {
    pub id: Snowflake,
    pub name: String,
}

/// Outbound platform actions
#[async_trait]
pub trait Platform: Send + Sync {
    // ------------------------------------------------------------------
    // Posts & messaging
    // ------------------------------------------------------------------

    /// Delete a post from the channel (rejection compensations)
    async fn delete_post(&self, channel_id: Snowflake, post_id: Snowflake) -> PlatformResult<()>;

    /// Send a private notice to a user
    async fn send_direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()>;

    /// Open a thread on a post; returns the thread id
    async fn create_thread(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        title: &str,
    ) -> PlatformResult<Snowflake>;

    /// Post a message inside a thread
    async fn send_threaded_message(
        &self,
        thread_id: Snowflake,
        content: &str,
    ) -> PlatformResult<()>;

    // ------------------------------------------------------------------
    // Reactions (always the bot's own)
    // ------------------------------------------------------------------

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()>;

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        emoji: &str,
    ) -> PlatformResult<()>;

    /// Emojis the bot itself currently has on a post (stale auto-tag sweep
    /// on edit)
    async fn own_reactions(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
    ) -> PlatformResult<Vec<String>>;

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// All roles currently defined in the guild
    async fn guild_roles(&self) -> PlatformResult<Vec<PlatformRole>>;

    /// Create a role, optionally with a PNG icon
    async fn create_role(&self, name: &str, icon_png: Option<&[u8]>)
        -> PlatformResult<PlatformRole>;

    async fn delete_role(&self, role_id: Snowflake) -> PlatformResult<()>;

    async fn assign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()>;

    async fn unassign_role(&self, user_id: Snowflake, role_id: Snowflake) -> PlatformResult<()>;

    /// Members currently holding a role
    async fn role_member_count(&self, role_id: Snowflake) -> PlatformResult<usize>;

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    /// Fetch the full guild member list
    async fn fetch_members(&self) -> PlatformResult<Vec<MemberIdentity>>;
}
