//! Streak advancement inside a unit of work

use chrono::NaiveDate;
use gram_core::{advance_streak, ArchiveTx, Snowflake, StreakEvent, StreakOutcome};
use tracing::debug;

use super::error::ServiceResult;

/// Advance a user's streak for an accepted post dated `today`
///
/// The record is read under a row lock so concurrent transitions for one
/// user serialize even across processes. A same-day repeat (`Again`)
/// writes nothing.
pub async fn advance(
    tx: &mut dyn ArchiveTx,
    user_id: Snowflake,
    today: NaiveDate,
) -> ServiceResult<StreakOutcome> {
    let existing = tx.streak_for_update(user_id).await?;
    let outcome = advance_streak(user_id, today, existing.as_ref());

    if outcome.event != StreakEvent::Again {
        tx.put_streak(&outcome.record).await?;
    }

    debug!(
        user_id = %user_id,
        event = outcome.event.as_str(),
        streak = outcome.record.current_streak,
        "Streak advanced"
    );
    Ok(outcome)
}
