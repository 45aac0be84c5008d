//! Streak engine - pure daily-streak state machine

mod engine;

pub use engine::{advance_streak, StreakEvent, StreakOutcome};
