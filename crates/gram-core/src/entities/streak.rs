//! StreakRecord entity - per-user daily posting streak state

use chrono::NaiveDate;

use crate::value_objects::Snowflake;

/// StreakRecord entity, one per user, never deleted
///
/// Invariants: `current_streak >= 1` once the record exists,
/// `max_streak >= current_streak`, and `last_post_date` never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakRecord {
    pub user_id: Snowflake,
    pub current_streak: i32,
    pub max_streak: i32,
    pub last_post_date: NaiveDate,
}

impl StreakRecord {
    /// Record for a user's first accepted post
    pub fn first(user_id: Snowflake, today: NaiveDate) -> Self {
        Self {
            user_id,
            current_streak: 1,
            max_streak: 1,
            last_post_date: today,
        }
    }

    /// Whole days elapsed since the last accepted post
    pub fn days_since(&self, today: NaiveDate) -> i64 {
        (today - self.last_post_date).num_days()
    }

    /// A streak goes stale once a full calendar day passes with no post
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.days_since(today) >= 2
    }
}
