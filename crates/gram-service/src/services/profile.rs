//! Profile mirror service

use std::path::{Path, PathBuf};

use gram_core::{MemberIdentity, Snowflake, UserProfile};
use tracing::{debug, instrument, warn};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Keeps the archived profile rows and avatar files in step with the
/// platform's view of a member
pub struct ProfileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProfileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Mirror the member's avatar to `{avatars_dir}/{user_id}.png`
    ///
    /// Returns the local path when a file is available. An unreachable
    /// avatar is tolerated: a previously mirrored file keeps serving, and
    /// a member without one simply has no path.
    pub async fn mirror_avatar(&self, member: &MemberIdentity) -> Option<String> {
        let url = member.avatar_url.as_deref()?;
        let path = self.avatar_path(member.id);

        let fetched = match self.ctx.fetcher().mirror(url, &path).await {
            Ok(fetched) => fetched,
            Err(error) => {
                warn!(user_id = %member.id, %error, "Avatar mirror failed");
                false
            }
        };

        if fetched || path.exists() {
            Some(path.to_string_lossy().into_owned())
        } else {
            None
        }
    }

    /// Build the profile row for a member with its mirrored avatar path
    #[must_use]
    pub fn to_profile(&self, member: &MemberIdentity, avatar_path: Option<String>) -> UserProfile {
        let mut profile = UserProfile::new(
            member.id,
            member.username.clone(),
            member.display_name.clone(),
        );
        profile.set_avatar_path(avatar_path);
        profile
    }

    /// Refresh an archived profile from a fresh platform sighting
    ///
    /// Profiles exist only while the member has archived posts, so a
    /// member without one is skipped rather than created. Returns whether
    /// a row was refreshed.
    #[instrument(skip(self, member), fields(user_id = %member.id))]
    pub async fn refresh(&self, member: &MemberIdentity) -> ServiceResult<bool> {
        if self.ctx.store().find_profile(member.id).await?.is_none() {
            debug!("No archived profile, skipping refresh");
            return Ok(false);
        }

        let avatar_path = self.mirror_avatar(member).await;
        let profile = self.to_profile(member, avatar_path);

        let mut tx = self.ctx.store().begin().await?;
        tx.upsert_profile(&profile).await?;
        tx.commit().await?;

        debug!("Profile refreshed");
        Ok(true)
    }

    fn avatar_path(&self, user_id: Snowflake) -> PathBuf {
        Path::new(&self.ctx.storage().avatars_dir).join(format!("{user_id}.png"))
    }
}
