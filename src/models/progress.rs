use crate::models::snapshot::{ReadingProgressSnapshot, WINDOW_DAYS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Day-of-month of each slot, oldest first.
    pub labels: [u32; WINDOW_DAYS],
    pub values: [u32; WINDOW_DAYS],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub pages_read_today: u32,
    pub daily_goal: u32,
    pub remaining_pages: u32,
    /// Not clamped: reading past the goal reports more than 100.
    pub today_progress_percent: u32,
    pub goal_met: bool,
}

/// Output of a reconciliation: the snapshot to persist and the derived views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledState {
    pub snapshot: ReadingProgressSnapshot,
    /// True when the window moved across a day boundary and must be written back.
    pub shifted: bool,
    pub chart: ChartSeries,
    pub stats: TodayStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Today's count becomes exactly the logged value.
    Absolute,
    /// The logged value is added to today's count.
    Delta,
}

/// Result of a logging or goal update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOutcome {
    pub state: ReconciledState,
    /// Change applied to today's count, recorded in the session log.
    pub pages_delta: i64,
    /// Tells the caller to refresh dependent statistics.
    pub refresh_stats: bool,
}
