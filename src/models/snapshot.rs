use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of calendar days tracked by the rolling window.
pub const WINDOW_DAYS: usize = 7;

/// Pages/day target used when nothing else is configured.
pub const DEFAULT_DAILY_GOAL: u32 = 30;

/// Persisted per-user reading progress. `days[0]` is the oldest tracked day,
/// `days[6]` is the day of `last_updated_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgressSnapshot {
    pub user_id: String,
    pub days: [u32; WINDOW_DAYS],
    pub manual_pages_today: u32,
    pub daily_goal: u32,
    pub streak: u32,
    pub last_updated_date: Option<NaiveDate>,
}

impl ReadingProgressSnapshot {
    /// Snapshot used when the store has no row for `user_id`.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self::with_goal(user_id, DEFAULT_DAILY_GOAL)
    }

    pub fn with_goal(user_id: impl Into<String>, daily_goal: u32) -> Self {
        Self {
            user_id: user_id.into(),
            days: [0; WINDOW_DAYS],
            manual_pages_today: 0,
            daily_goal: daily_goal.max(1),
            streak: 0,
            last_updated_date: None,
        }
    }

    /// Sum of the tracked window, persisted separately as `totalPagesRead`.
    pub fn total_pages_read(&self) -> u32 {
        self.days.iter().fold(0u32, |acc, d| acc.saturating_add(*d))
    }

    pub fn pages_today(&self) -> u32 {
        self.days[WINDOW_DAYS - 1]
    }
}
