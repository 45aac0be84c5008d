//! Level role service
//!
//! Streak levels are exclusive guild roles named `"{prefix} {streak}"`,
//! each carrying a rendered numeral badge. A member holds at most one at
//! a time; a level role nobody holds anymore is deleted outright.

use gram_core::{MemberIdentity, PlatformRole, Snowflake, StreakOutcome};
use tracing::{info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Keeps guild level roles in step with streak values
pub struct LevelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> LevelService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Grant the role for a fresh streak value, retiring any other level
    /// role the member holds
    ///
    /// Runs after the archival committed; the caller decides what a
    /// failure here means (the archive row must stand either way).
    #[instrument(skip(self, member, outcome), fields(user_id = %member.id, streak = outcome.record.current_streak))]
    pub async fn sync_after_post(
        &self,
        member: &MemberIdentity,
        outcome: &StreakOutcome,
    ) -> ServiceResult<()> {
        let streak = outcome.record.current_streak;
        let prefix = &self.ctx.leveling().role_prefix;
        let target_name = format!("{prefix} {streak}");
        let roles = self.ctx.platform().guild_roles().await?;

        let target = match roles.iter().find(|role| role.name == target_name) {
            Some(role) => role.clone(),
            None => self.create_level_role(&target_name, streak).await?,
        };

        for role in &roles {
            if role.id != target.id
                && member.roles.contains(&role.id)
                && is_level_role(prefix, &role.name)
            {
                self.retire_role_for(member.id, role).await?;
            }
        }

        if !member.roles.contains(&target.id) {
            self.ctx.platform().assign_role(member.id, target.id).await?;
        }

        info!(role = %target.name, "Level role granted");
        Ok(())
    }

    /// Whether the member currently holds any level role
    #[must_use]
    pub fn holds_level_role(&self, member: &MemberIdentity, roles: &[PlatformRole]) -> bool {
        let prefix = &self.ctx.leveling().role_prefix;
        roles
            .iter()
            .any(|role| member.roles.contains(&role.id) && is_level_role(prefix, &role.name))
    }

    /// Strip a member's level roles without replacement (stale streak)
    ///
    /// Returns how many roles were removed.
    pub async fn revoke_stale(
        &self,
        member: &MemberIdentity,
        roles: &[PlatformRole],
    ) -> ServiceResult<u32> {
        let prefix = &self.ctx.leveling().role_prefix;
        let mut revoked = 0;

        for role in roles {
            if member.roles.contains(&role.id) && is_level_role(prefix, &role.name) {
                self.retire_role_for(member.id, role).await?;
                revoked += 1;
            }
        }

        if revoked > 0 {
            info!(user_id = %member.id, revoked, "Revoked stale level roles");
        }
        Ok(revoked)
    }

    /// Unassign a level role from a member, deleting it once memberless
    async fn retire_role_for(&self, user_id: Snowflake, role: &PlatformRole) -> ServiceResult<()> {
        self.ctx.platform().unassign_role(user_id, role.id).await?;

        if self.ctx.platform().role_member_count(role.id).await? == 0 {
            self.ctx.platform().delete_role(role.id).await?;
            info!(role = %role.name, "Deleted memberless level role");
        }

        Ok(())
    }

    /// Create the level role with its rendered badge
    ///
    /// A badge that cannot be rendered or read degrades to an icon-less
    /// role rather than blocking the grant.
    async fn create_level_role(&self, name: &str, streak: i32) -> ServiceResult<PlatformRole> {
        let ctx = self.ctx.clone();
        let rendered = tokio::task::spawn_blocking(move || ctx.badges().icon_for_level(streak))
            .await
            .map_err(|error| ServiceError::internal(format!("badge task failed: {error}")))?;

        let icon = match rendered {
            Ok(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => Some(bytes),
                Err(error) => {
                    warn!(%error, path = %path.display(), "Could not read badge file");
                    None
                }
            },
            Err(error) => {
                warn!(%error, streak, "Badge rendering failed");
                None
            }
        };

        let role = self
            .ctx
            .platform()
            .create_role(name, icon.as_deref())
            .await?;
        info!(role = %role.name, "Created level role");
        Ok(role)
    }
}

/// Whether a role name is `"{prefix} {digits}"`
fn is_level_role(prefix: &str, name: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(' '))
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}
