//! # gram-core
//!
//! The domain layer: entities, the streak engine, inbound gateway events,
//! and the ports every other crate plugs into. Nothing here touches a
//! database, a socket, or the filesystem.

pub mod entities;
pub mod error;
pub mod events;
pub mod streak;
pub mod traits;
pub mod value_objects;

pub use entities::{
    is_reserved_emoji, parse_custom_emoji, Attachment, AttachmentKind, CustomEmoji, Post,
    StreakRecord, Tag, UserProfile, FAILURE_EMOJI, SUCCESS_EMOJI, THUMBNAIL_SUFFIX,
};
pub use error::DomainError;
pub use events::{GatewayEvent, IncomingAttachment, MemberIdentity};
pub use streak::{advance_streak, StreakEvent, StreakOutcome};
pub use traits::{ArchiveStore, ArchiveTx, Platform, PlatformResult, PlatformRole, RepoResult};
pub use value_objects::{ExtensionPolicy, InvalidSnowflake, Snowflake, SnowflakeGenerator};
