//! Tag entity - an emoji-keyed annotation mirroring reaction state on a post

use crate::value_objects::Snowflake;

/// Reaction the pipeline adds to a post once archival succeeds
pub const SUCCESS_EMOJI: &str = "\u{1F680}";

/// Reaction the pipeline adds to a post whose archival failed
pub const FAILURE_EMOJI: &str = "\u{274C}";

/// Status emojis reserved by the pipeline, invisible to the tag lifecycle
pub fn is_reserved_emoji(emoji: &str) -> bool {
    emoji == SUCCESS_EMOJI || emoji == FAILURE_EMOJI
}

/// Tag entity, unique per (post_id, emoji_key)
///
/// `emoji_key` is either a unicode emoji or a platform custom emoji in its
/// `<:name:id>` wire form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub emoji_key: String,
    pub description: String,
    pub icon_path: Option<String>,
}

impl Tag {
    /// Create a new Tag
    pub fn new(
        id: Snowflake,
        post_id: Snowflake,
        emoji_key: String,
        description: String,
        icon_path: Option<String>,
    ) -> Self {
        Self {
            id,
            post_id,
            emoji_key,
            description,
            icon_path,
        }
    }
}

/// A custom emoji parsed from its `<:name:id>` (or animated `<a:name:id>`)
/// wire form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEmoji {
    pub name: String,
    pub id: Snowflake,
}

/// Parse a custom emoji key; returns None for unicode emoji
pub fn parse_custom_emoji(emoji_key: &str) -> Option<CustomEmoji> {
    let inner = emoji_key.strip_prefix('<')?.strip_suffix('>')?;
    let inner = inner.strip_prefix("a:").or_else(|| inner.strip_prefix(':'))?;
    let (name, id) = inner.split_once(':')?;
    if name.is_empty() {
        return None;
    }
    let id = Snowflake::parse(id).ok()?;
    Some(CustomEmoji {
        name: name.to_string(),
        id,
    })
}
