//! Daily streak reconciliation
//!
//! Members keep a level role only while they post. Once a day (and once at
//! startup) this pass walks the guild membership and strips level roles from
//! anyone whose streak has lapsed, deleting role definitions that end up
//! with no members.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use gram_core::{MemberIdentity, PlatformRole};

use super::context::ServiceContext;
use super::error::ServiceResult;
use super::level::LevelService;
use super::profile::ProfileService;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileSummary {
    /// Members inspected
    pub members_seen: usize,
    /// Level roles removed
    pub roles_revoked: u32,
    /// Members skipped because their reconciliation errored
    pub failures: u32,
}

/// Revokes level roles from members whose streak has gone stale
pub struct ReconcileService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReconcileService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Run a full pass against the current guild membership
    #[instrument(skip(self))]
    pub async fn run(&self) -> ServiceResult<ReconcileSummary> {
        let members = self.ctx.platform().fetch_members().await?;
        self.reconcile_members(&members).await
    }

    /// Startup pass over the membership snapshot the gateway delivers
    ///
    /// Besides the role reconciliation, the startup pass refreshes the
    /// stored profile of every member the archive already knows.
    #[instrument(skip(self, members), fields(members = members.len()))]
    pub async fn startup(&self, members: &[MemberIdentity]) -> ServiceResult<ReconcileSummary> {
        let profiles = ProfileService::new(self.ctx);
        for member in members {
            if let Err(error) = profiles.refresh(member).await {
                warn!(user_id = %member.id, %error, "Profile refresh failed");
            }
        }
        self.reconcile_members(members).await
    }

    /// Run a pass over an already-fetched member list (startup snapshot)
    ///
    /// A failure for one member is logged and counted; it never aborts the
    /// rest of the pass.
    #[instrument(skip(self, members), fields(members = members.len()))]
    pub async fn reconcile_members(
        &self,
        members: &[MemberIdentity],
    ) -> ServiceResult<ReconcileSummary> {
        let roles = self.ctx.platform().guild_roles().await?;
        let today = self.ctx.today();
        let levels = LevelService::new(self.ctx);

        let mut summary = ReconcileSummary {
            members_seen: members.len(),
            ..ReconcileSummary::default()
        };

        for member in members {
            match self.reconcile_one(&levels, &roles, member, today).await {
                Ok(revoked) => summary.roles_revoked += revoked,
                Err(error) => {
                    warn!(user_id = %member.id, %error, "Reconciliation failed for member");
                    summary.failures += 1;
                }
            }
        }

        info!(
            members = summary.members_seen,
            revoked = summary.roles_revoked,
            failures = summary.failures,
            "Reconciliation pass finished"
        );
        Ok(summary)
    }

    /// Reconcile a single member, returning how many roles were revoked
    ///
    /// A member with no streak record but still wearing a level role lost
    /// the record somehow (manual role grant, wiped archive); the role is
    /// revoked just like a lapsed streak.
    async fn reconcile_one(
        &self,
        levels: &LevelService<'_>,
        roles: &[PlatformRole],
        member: &MemberIdentity,
        today: NaiveDate,
    ) -> ServiceResult<u32> {
        if !levels.holds_level_role(member, roles) {
            return Ok(0);
        }

        let stale = match self.ctx.store().find_streak(member.id).await? {
            Some(record) => record.is_stale(today),
            None => true,
        };
        if !stale {
            return Ok(0);
        }

        levels.revoke_stale(member, roles).await
    }
}

// Reconciliation needs a platform and an archive store; the pass is covered
// end to end by the pipeline integration tests.
