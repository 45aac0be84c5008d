//! REST request and response shapes
//!
//! Only the fields the bot reads are modelled; the platform sends far more.

use serde::{Deserialize, Serialize};

use gram_core::{PlatformRole, Snowflake};

use crate::protocol::WireEmoji;

/// Message as returned by `GET /channels/{id}/messages/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct RestMessage {
    pub id: Snowflake,
    #[serde(default)]
    pub reactions: Vec<RestReaction>,
}

/// One reaction summary on a message
#[derive(Debug, Clone, Deserialize)]
pub struct RestReaction {
    pub emoji: WireEmoji,
    pub count: i64,
    /// Whether the bot itself is among the reactors
    #[serde(default)]
    pub me: bool,
}

/// Role object from the guild roles endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct RestRole {
    pub id: Snowflake,
    pub name: String,
}

impl From<RestRole> for PlatformRole {
    fn from(role: RestRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
        }
    }
}

/// Channel object; threads and DM channels both come back as channels
#[derive(Debug, Clone, Deserialize)]
pub struct RestChannel {
    pub id: Snowflake,
}

/// Body for `POST /users/@me/channels`
#[derive(Debug, Serialize)]
pub struct CreateDmBody {
    pub recipient_id: Snowflake,
}

/// Body for `POST /channels/{id}/messages`
#[derive(Debug, Serialize)]
pub struct CreateMessageBody<'a> {
    pub content: &'a str,
}

/// Body for `POST /channels/{id}/messages/{id}/threads`
#[derive(Debug, Serialize)]
pub struct CreateThreadBody<'a> {
    pub name: &'a str,
}

/// Body for `POST /guilds/{id}/roles`
#[derive(Debug, Serialize)]
pub struct CreateRoleBody<'a> {
    pub name: &'a str,
    /// PNG icon as a base64 data URI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Body of a 429 response
#[derive(Debug, Deserialize)]
pub struct RateLimitBody {
    /// Seconds to wait before retrying
    pub retry_after: f64,
}
