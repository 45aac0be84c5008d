//! StreakRecord entity <-> model mapper

use chrono::NaiveDate;

use gram_core::entities::StreakRecord;
use gram_core::value_objects::Snowflake;

use crate::models::StreakModel;

/// Convert StreakModel to StreakRecord entity
impl From<StreakModel> for StreakRecord {
    fn from(model: StreakModel) -> Self {
        StreakRecord {
            user_id: Snowflake::from_db(model.user_id),
            current_streak: model.current_streak,
            max_streak: model.max_streak,
            last_post_date: model.last_post_date,
        }
    }
}

/// Convert StreakRecord entity reference to values for an upsert
pub struct StreakUpsert {
    pub user_id: i64,
    pub current_streak: i32,
    pub max_streak: i32,
    pub last_post_date: NaiveDate,
}

impl StreakUpsert {
    pub fn new(record: &StreakRecord) -> Self {
        Self {
            user_id: record.user_id.as_db(),
            current_streak: record.current_streak,
            max_streak: record.max_streak,
            last_post_date: record.last_post_date,
        }
    }
}
