//! Pure streak transition function
//!
//! No clock and no storage: callers pass "today" in, which keeps the
//! transition deterministic and testable, and lets the caller pin the whole
//! unit of work to one calendar date.

use chrono::NaiveDate;

use crate::entities::StreakRecord;
use crate::value_objects::Snowflake;

/// What an accepted post did to the author's streak
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakEvent {
    /// First accepted post ever
    New,
    /// Another post on an already-counted day
    Again,
    /// Consecutive-day continuation
    Ok,
    /// Gap of two or more days, chain restarted
    Reset,
}

impl StreakEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Again => "again",
            Self::Ok => "ok",
            Self::Reset => "reset",
        }
    }

    /// Whether the level role must be re-synchronized
    #[inline]
    pub fn changes_level(&self) -> bool {
        !matches!(self, Self::Again)
    }
}

/// Result of one engine invocation
///
/// `days_since_last` is defined on every transition (0 when the user had no
/// record), so downstream consumers never read an unset gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakOutcome {
    pub record: StreakRecord,
    pub event: StreakEvent,
    pub days_since_last: i64,
}

/// Advance a user's streak for an accepted post dated `today`
pub fn advance_streak(
    user_id: Snowflake,
    today: NaiveDate,
    existing: Option<&StreakRecord>,
) -> StreakOutcome {
    let Some(previous) = existing else {
        return StreakOutcome {
            record: StreakRecord::first(user_id, today),
            event: StreakEvent::New,
            days_since_last: 0,
        };
    };

    let days_since_last = previous.days_since(today);

    let (record, event) = match days_since_last {
        0 => (*previous, StreakEvent::Again),
        1 => {
            let current = previous.current_streak + 1;
            (
                StreakRecord {
                    user_id: previous.user_id,
                    current_streak: current,
                    max_streak: previous.max_streak.max(current),
                    last_post_date: today,
                },
                StreakEvent::Ok,
            )
        }
        _ => (
            StreakRecord {
                user_id: previous.user_id,
                current_streak: 1,
                max_streak: previous.max_streak,
                last_post_date: today,
            },
            StreakEvent::Reset,
        ),
    };

    StreakOutcome {
        record,
        event,
        days_since_last,
    }
}
