//! Attachment entity - a file owned by exactly one post

use crate::value_objects::Snowflake;

/// Suffix appended to an attachment path to form its derived thumbnail path
pub const THUMBNAIL_SUFFIX: &str = ".thumb.jpg";

/// Attachment kind, classified from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    Audio,
    Unknown,
}

impl AttachmentKind {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Unknown => "unknown",
        }
    }

    /// Parse the storage representation; anything unrecognized is Unknown
    pub fn parse(s: &str) -> Self {
        match s {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            _ => Self::Unknown,
        }
    }

    /// Kinds that get a derived thumbnail
    #[inline]
    pub fn has_thumbnail(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Attachment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Snowflake,
    pub post_id: Snowflake,
    pub path: String,
    pub kind: AttachmentKind,
}

impl Attachment {
    /// Create a new Attachment
    pub fn new(id: Snowflake, post_id: Snowflake, path: String, kind: AttachmentKind) -> Self {
        Self {
            id,
            post_id,
            path,
            kind,
        }
    }

    /// Deterministic path of the derived thumbnail, for kinds that have one
    pub fn thumbnail_path(&self) -> Option<String> {
        self.kind
            .has_thumbnail()
            .then(|| format!("{}{}", self.path, THUMBNAIL_SUFFIX))
    }
}
