//! Test fixtures and event builders

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

use gram_common::BotConfig;
use gram_core::events::{
    GatewayEvent, MemberProfileUpdatedEvent, MembershipSnapshotEvent, PostCreatedEvent,
    PostDeletedEvent, PostEditedEvent, ReactionAddedEvent, ReactionClearedAllEvent,
    ReactionClearedOneEvent, ReactionRemovedEvent,
};
use gram_core::{IncomingAttachment, MemberIdentity, Snowflake};

static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Returns a unique suffix so concurrent tests never share state
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// The guild every fixture event belongs to
pub const GUILD_ID: u64 = 1;

/// The community channel every fixture event targets
pub const CHANNEL_ID: u64 = 777;

pub fn channel() -> Snowflake {
    Snowflake::new(CHANNEL_ID)
}

pub fn bot_config() -> BotConfig {
    BotConfig {
        token: "test-token".to_string(),
        guild_id: Snowflake::new(GUILD_ID),
        channel_id: channel(),
        gateway_url: "wss://gateway.test".to_string(),
        api_base: "https://api.test".to_string(),
        cdn_base: "https://cdn.test".to_string(),
        web_base_url: "https://gram.test".to_string(),
    }
}

// ============================================================================
// Members
// ============================================================================

/// A plain member with no avatar and no roles
pub fn member(id: u64) -> MemberIdentity {
    MemberIdentity::new(
        Snowflake::new(id),
        format!("membre{id}"),
        format!("Membre {id}"),
    )
}

/// A member whose gateway snapshot already carries the given roles
pub fn member_with_roles(id: u64, roles: &[Snowflake]) -> MemberIdentity {
    let mut member = member(id);
    member.roles = roles.to_vec();
    member
}

/// A member with a remote avatar to mirror
pub fn member_with_avatar(id: u64, avatar_url: &str) -> MemberIdentity {
    let mut member = member(id);
    member.avatar_url = Some(avatar_url.to_string());
    member
}

// ============================================================================
// Events
// ============================================================================

/// Builds the attachment list a platform message would announce; ids are
/// derived from the post id and the filename position
pub fn attachments(post_id: u64, filenames: &[&str]) -> Vec<IncomingAttachment> {
    filenames
        .iter()
        .enumerate()
        .map(|(index, name)| IncomingAttachment {
            id: Snowflake::new(post_id * 100 + index as u64 + 1),
            filename: (*name).to_string(),
            url: format!("https://cdn.test/files/{post_id}/{name}"),
        })
        .collect()
}

pub fn post_created(
    post_id: u64,
    author: &MemberIdentity,
    content: &str,
    filenames: &[&str],
) -> GatewayEvent {
    GatewayEvent::PostCreated(PostCreatedEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
        author: author.clone(),
        content: content.to_string(),
        attachments: attachments(post_id, filenames),
        timestamp: Utc::now(),
    })
}

pub fn post_edited(
    post_id: u64,
    author: &MemberIdentity,
    content: &str,
    filenames: &[&str],
) -> GatewayEvent {
    GatewayEvent::PostEdited(PostEditedEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
        author: author.clone(),
        content: content.to_string(),
        attachments: attachments(post_id, filenames),
    })
}

pub fn post_deleted(post_id: u64) -> GatewayEvent {
    GatewayEvent::PostDeleted(PostDeletedEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
    })
}

pub fn reaction_added(post_id: u64, user_id: u64, emoji: &str) -> GatewayEvent {
    GatewayEvent::ReactionAdded(ReactionAddedEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
        user_id: Snowflake::new(user_id),
        emoji: emoji.to_string(),
    })
}

pub fn reaction_removed(post_id: u64, user_id: u64, emoji: &str, remaining: i64) -> GatewayEvent {
    GatewayEvent::ReactionRemoved(ReactionRemovedEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
        user_id: Snowflake::new(user_id),
        emoji: emoji.to_string(),
        remaining,
    })
}

pub fn reaction_cleared_one(post_id: u64, emoji: &str) -> GatewayEvent {
    GatewayEvent::ReactionClearedOne(ReactionClearedOneEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
        emoji: emoji.to_string(),
    })
}

pub fn reaction_cleared_all(post_id: u64) -> GatewayEvent {
    GatewayEvent::ReactionClearedAll(ReactionClearedAllEvent {
        post_id: Snowflake::new(post_id),
        channel_id: channel(),
    })
}

pub fn profile_updated(member: &MemberIdentity) -> GatewayEvent {
    GatewayEvent::MemberProfileUpdated(MemberProfileUpdatedEvent {
        member: member.clone(),
    })
}

pub fn snapshot(members: Vec<MemberIdentity>) -> GatewayEvent {
    GatewayEvent::MembershipSnapshot(MembershipSnapshotEvent { members })
}
