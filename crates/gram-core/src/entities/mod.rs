//! Domain entities - core business objects

mod attachment;
mod post;
mod streak;
mod tag;
mod user_profile;

pub use attachment::{Attachment, AttachmentKind, THUMBNAIL_SUFFIX};
pub use post::Post;
pub use streak::StreakRecord;
pub use tag::{is_reserved_emoji, parse_custom_emoji, CustomEmoji, Tag, FAILURE_EMOJI, SUCCESS_EMOJI};
pub use user_profile::UserProfile;
