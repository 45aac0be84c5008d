//! UserProfile entity - mirror of a platform member's identity

use crate::value_objects::Snowflake;

/// UserProfile entity
///
/// Exists only while the user has at least one archived post; removed with
/// their last post. The streak record outlives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Snowflake,
    pub username: String,
    pub display_name: String,
    pub avatar_path: Option<String>,
}

impl UserProfile {
    /// Create a new UserProfile
    pub fn new(id: Snowflake, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            avatar_path: None,
        }
    }

    /// Record the locally mirrored avatar file
    pub fn set_avatar_path(&mut self, path: Option<String>) {
        self.avatar_path = path;
    }
}
