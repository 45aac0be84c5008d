//! Wire payload definitions
//!
//! Handshake payloads plus the dispatch payload shapes the decoder
//! consumes. The platform sends ids as strings; `Snowflake` accepts both
//! string and integer forms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gram_core::{IncomingAttachment, MemberIdentity, Snowflake};

/// Payload for op 10 (Hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload for op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Bot authentication token
    pub token: String,

    /// Event subscription bitfield
    pub intents: u64,

    /// Client properties
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    /// Guilds, members, messages, reactions, and message content
    pub const INTENTS: u64 = (1 << 0) | (1 << 1) | (1 << 9) | (1 << 10) | (1 << 15);

    /// Create an Identify payload with the subscriptions the bot needs
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            intents: Self::INTENTS,
            properties: IdentifyProperties::current(),
        }
    }
}

/// Client connection properties
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyProperties {
    pub os: String,
    pub browser: String,
    pub device: String,
}

impl IdentifyProperties {
    /// Properties describing this process
    #[must_use]
    pub fn current() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            browser: "gram".to_string(),
            device: "gram".to_string(),
        }
    }
}

// =========================================================================
// Dispatch payloads
// =========================================================================

/// User object as it appears inside dispatch payloads
#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: Snowflake,
    pub username: String,
    #[serde(default)]
    pub global_name: Option<String>,
    /// Avatar hash; the CDN URL is derived from it
    #[serde(default)]
    pub avatar: Option<String>,
}

impl WireUser {
    /// CDN URL of the user's avatar, when they have one
    #[must_use]
    pub fn avatar_url(&self, cdn_base: &str) -> Option<String> {
        self.avatar
            .as_ref()
            .map(|hash| format!("{cdn_base}/avatars/{}/{hash}.png", self.id))
    }

    /// Display name: the global name when set, the username otherwise
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.global_name.as_deref().unwrap_or(&self.username)
    }

    /// Identity with guild-local overrides folded in
    pub(crate) fn identity(
        &self,
        cdn_base: &str,
        nick: Option<&str>,
        roles: Vec<Snowflake>,
    ) -> MemberIdentity {
        let display = nick.unwrap_or_else(|| self.display_name());
        let mut member = MemberIdentity::new(self.id, &self.username, display);
        member.avatar_url = self.avatar_url(cdn_base);
        member.roles = roles;
        member
    }
}

/// Guild member object: a user plus guild-local overrides
#[derive(Debug, Clone, Deserialize)]
pub struct WireMember {
    pub user: WireUser,
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

impl WireMember {
    /// Flatten into the identity the services consume
    #[must_use]
    pub fn identity(&self, cdn_base: &str) -> MemberIdentity {
        self.user
            .identity(cdn_base, self.nick.as_deref(), self.roles.clone())
    }
}

/// Partial member attached to message payloads (carries no user object)
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessageMember {
    #[serde(default)]
    pub nick: Option<String>,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
}

/// Attachment entry inside a message payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireAttachment {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
}

impl From<WireAttachment> for IncomingAttachment {
    fn from(attachment: WireAttachment) -> Self {
        Self {
            id: attachment.id,
            filename: attachment.filename,
            url: attachment.url,
        }
    }
}

/// Message object for MESSAGE_CREATE and MESSAGE_UPDATE
///
/// Update payloads may be partial (embed crawls, pin changes); the decoder
/// skips frames missing the fields a post needs.
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    #[serde(default)]
    pub author: Option<WireUser>,
    #[serde(default)]
    pub member: Option<WireMessageMember>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attachments: Vec<WireAttachment>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl WireMessage {
    /// Author identity with guild-local nick and roles folded in
    #[must_use]
    pub fn author_identity(&self, cdn_base: &str) -> Option<MemberIdentity> {
        let author = self.author.as_ref()?;
        let (nick, roles) = match &self.member {
            Some(member) => (member.nick.as_deref(), member.roles.clone()),
            None => (None, Vec::new()),
        };
        Some(author.identity(cdn_base, nick, roles))
    }
}

/// MESSAGE_DELETE payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireMessageDelete {
    pub id: Snowflake,
    pub channel_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

/// Emoji object inside reaction payloads
///
/// `id` is set only for custom emojis. `name` is the unicode glyph for
/// standard emojis, the emoji name for custom ones, and null when a custom
/// emoji was deleted from the guild.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEmoji {
    #[serde(default)]
    pub id: Option<Snowflake>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub animated: bool,
}

impl WireEmoji {
    /// Canonical emoji key: the glyph itself, or the `<:name:id>` form
    #[must_use]
    pub fn key(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        match self.id {
            Some(id) if self.animated => Some(format!("<a:{name}:{id}>")),
            Some(id) => Some(format!("<:{name}:{id}>")),
            None => Some(name.to_string()),
        }
    }
}

/// MESSAGE_REACTION_ADD / MESSAGE_REACTION_REMOVE payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireReaction {
    pub user_id: Snowflake,
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
    pub emoji: WireEmoji,
}

/// MESSAGE_REACTION_REMOVE_EMOJI payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireReactionClearEmoji {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
    pub emoji: WireEmoji,
}

/// MESSAGE_REACTION_REMOVE_ALL payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireReactionClearAll {
    pub channel_id: Snowflake,
    pub message_id: Snowflake,
}

/// GUILD_MEMBER_UPDATE payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireMemberUpdate {
    pub guild_id: Snowflake,
    #[serde(default)]
    pub roles: Vec<Snowflake>,
    pub user: WireUser,
    #[serde(default)]
    pub nick: Option<String>,
}

impl WireMemberUpdate {
    /// Flatten into the identity the services consume
    #[must_use]
    pub fn identity(&self, cdn_base: &str) -> MemberIdentity {
        self.user
            .identity(cdn_base, self.nick.as_deref(), self.roles.clone())
    }
}

/// GUILD_CREATE payload, reduced to the fields the bot consumes
#[derive(Debug, Clone, Deserialize)]
pub struct WireGuild {
    pub id: Snowflake,
    #[serde(default)]
    pub members: Vec<WireMember>,
}

/// READY payload
#[derive(Debug, Clone, Deserialize)]
pub struct WireReady {
    #[serde(default)]
    pub session_id: Option<String>,
    pub user: WireUser,
}
