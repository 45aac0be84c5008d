//! Streak database model

use chrono::NaiveDate;
use sqlx::FromRow;

/// Database model for the streaks table
#[derive(Debug, Clone, FromRow)]
pub struct StreakModel {
    pub user_id: i64,
    pub current_streak: i32,
    pub max_streak: i32,
    pub last_post_date: NaiveDate,
}
