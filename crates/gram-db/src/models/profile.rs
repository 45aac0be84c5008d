//! User profile database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for the profiles table
#[derive(Debug, Clone, FromRow)]
pub struct ProfileModel {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub avatar_path: Option<String>,
    pub updated_at: DateTime<Utc>,
}
