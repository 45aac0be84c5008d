//! Gateway events - the inbound event vocabulary of the pipeline
//!
//! The platform sends loosely shaped payloads; the gateway connection decodes
//! them into this tagged union so every handler sees a fixed, validated field
//! set per event kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// One platform member, unified across the platform's user and member shapes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberIdentity {
    pub id: Snowflake,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub roles: Vec<Snowflake>,
}

impl MemberIdentity {
    pub fn new(id: Snowflake, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            avatar_url: None,
            roles: Vec::new(),
        }
    }
}

/// An attachment as announced by the platform, not yet fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingAttachment {
    pub id: Snowflake,
    pub filename: String,
    pub url: String,
}

/// All inbound gateway events the pipeline reacts to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    // =========================================================================
    // Post Events
    // =========================================================================
    PostCreated(PostCreatedEvent),
    PostEdited(PostEditedEvent),
    PostDeleted(PostDeletedEvent),

    // =========================================================================
    // Reaction Events
    // =========================================================================
    ReactionAdded(ReactionAddedEvent),
    ReactionRemoved(ReactionRemovedEvent),
    ReactionClearedOne(ReactionClearedOneEvent),
    ReactionClearedAll(ReactionClearedAllEvent),

    // =========================================================================
    // Member Events
    // =========================================================================
    MemberProfileUpdated(MemberProfileUpdatedEvent),
    MembershipSnapshot(MembershipSnapshotEvent),
}

impl GatewayEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PostCreated(_) => "POST_CREATED",
            Self::PostEdited(_) => "POST_EDITED",
            Self::PostDeleted(_) => "POST_DELETED",
            Self::ReactionAdded(_) => "REACTION_ADDED",
            Self::ReactionRemoved(_) => "REACTION_REMOVED",
            Self::ReactionClearedOne(_) => "REACTION_CLEARED_ONE",
            Self::ReactionClearedAll(_) => "REACTION_CLEARED_ALL",
            Self::MemberProfileUpdated(_) => "MEMBER_PROFILE_UPDATED",
            Self::MembershipSnapshot(_) => "MEMBERSHIP_SNAPSHOT",
        }
    }

    /// The post this event concerns, when there is one (used for per-post
    /// handler serialization)
    pub fn post_id(&self) -> Option<Snowflake> {
        match self {
            Self::PostCreated(e) => Some(e.post_id),
            Self::PostEdited(e) => Some(e.post_id),
            Self::PostDeleted(e) => Some(e.post_id),
            Self::ReactionAdded(e) => Some(e.post_id),
            Self::ReactionRemoved(e) => Some(e.post_id),
            Self::ReactionClearedOne(e) => Some(e.post_id),
            Self::ReactionClearedAll(e) => Some(e.post_id),
            Self::MemberProfileUpdated(_) | Self::MembershipSnapshot(_) => None,
        }
    }

    /// The user whose state this event can mutate, when there is one (used
    /// for per-user handler serialization)
    pub fn user_id(&self) -> Option<Snowflake> {
        match self {
            Self::PostCreated(e) => Some(e.author.id),
            Self::PostEdited(e) => Some(e.author.id),
            Self::ReactionAdded(e) => Some(e.user_id),
            Self::ReactionRemoved(e) => Some(e.user_id),
            Self::MemberProfileUpdated(e) => Some(e.member.id),
            Self::PostDeleted(_)
            | Self::ReactionClearedOne(_)
            | Self::ReactionClearedAll(_)
            | Self::MembershipSnapshot(_) => None,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCreatedEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
    pub author: MemberIdentity,
    pub content: String,
    pub attachments: Vec<IncomingAttachment>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEditedEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
    pub author: MemberIdentity,
    pub content: String,
    pub attachments: Vec<IncomingAttachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDeletedEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionAddedEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionRemovedEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
    pub user_id: Snowflake,
    pub emoji: String,
    /// Reactions still held for this emoji after the removal, as reported by
    /// the platform
    pub remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionClearedOneEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionClearedAllEvent {
    pub post_id: Snowflake,
    pub channel_id: Snowflake,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberProfileUpdatedEvent {
    pub member: MemberIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipSnapshotEvent {
    pub members: Vec<MemberIdentity>,
}
