//! Daily reconciliation scheduler
//!
//! Sleeps until the next local midnight in the configured timezone, runs
//! the reconciliation pass, and repeats. Skipped local midnights (DST
//! spring-forward) roll over to the next valid day.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{info, warn};

use gram_service::services::ReconcileService;
use gram_service::ServiceContext;

/// Fires the reconciliation pass once per local day
pub struct ReconcileScheduler {
    ctx: ServiceContext,
}

impl ReconcileScheduler {
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn run(self) {
        loop {
            let now = Utc::now();
            let at = next_local_midnight(self.ctx.timezone(), now);
            let wait = (at - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %at, "Reconciliation scheduled");
            tokio::time::sleep(wait).await;

            match ReconcileService::new(&self.ctx).run().await {
                Ok(summary) => info!(
                    members = summary.members_seen,
                    revoked = summary.roles_revoked,
                    failures = summary.failures,
                    "Daily reconciliation complete"
                ),
                Err(error) => warn!(%error, "Daily reconciliation failed"),
            }
        }
    }
}

/// First local midnight strictly after `now`
fn next_local_midnight(tz: Tz, now: DateTime<Utc>) -> DateTime<Utc> {
    let mut day = now.with_timezone(&tz).date_naive();
    // A local midnight can be skipped by a DST jump; try a few days out.
    for _ in 0..3 {
        let Some(next) = day.succ_opt() else { break };
        day = next;
        if let Some(midnight) = local_midnight(tz, day) {
            if midnight > now {
                return midnight;
            }
        }
    }
    now + chrono::Duration::days(1)
}

fn local_midnight(tz: Tz, day: NaiveDate) -> Option<DateTime<Utc>> {
    let naive = day.and_hms_opt(0, 0, 0)?;
    let local = tz.from_local_datetime(&naive).earliest()?;
    Some(local.with_timezone(&Utc))
}
