//! UserProfile entity <-> model mapper

use gram_core::entities::UserProfile;
use gram_core::value_objects::Snowflake;

use crate::models::ProfileModel;

/// Convert ProfileModel to UserProfile entity
impl From<ProfileModel> for UserProfile {
    fn from(model: ProfileModel) -> Self {
        UserProfile {
            id: Snowflake::from_db(model.user_id),
            username: model.username,
            display_name: model.display_name,
            avatar_path: model.avatar_path,
        }
    }
}

/// Convert UserProfile entity reference to values for an upsert
pub struct ProfileUpsert<'a> {
    pub user_id: i64,
    pub username: &'a str,
    pub display_name: &'a str,
    pub avatar_path: Option<&'a str>,
}

impl<'a> ProfileUpsert<'a> {
    pub fn new(profile: &'a UserProfile) -> Self {
        Self {
            user_id: profile.id.as_db(),
            username: &profile.username,
            display_name: &profile.display_name,
            avatar_path: profile.avatar_path.as_deref(),
        }
    }
}
