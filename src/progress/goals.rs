use crate::error::{Result, TrackerError};
use crate::models::progress::TodayStats;
use crate::models::snapshot::ReadingProgressSnapshot;

/// Upper bound for a single pages entry and for the daily goal.
pub const MAX_PAGES_PER_LOG: u32 = 1000;

/// Validates a pages value coming from the UI: finite, whole, within `[0, 1000]`.
pub fn validate_pages(raw: f64) -> Result<u32> {
    whole_in_range(raw, 0, MAX_PAGES_PER_LOG).ok_or(TrackerError::InvalidPages(raw))
}

pub fn validate_daily_goal(raw: f64) -> Result<u32> {
    whole_in_range(raw, 1, MAX_PAGES_PER_LOG).ok_or(TrackerError::InvalidDailyGoal(raw))
}

pub(crate) fn whole_in_range(raw: f64, min: u32, max: u32) -> Option<u32> {
    if !raw.is_finite() || raw.fract() != 0.0 {
        return None;
    }
    if raw < f64::from(min) || raw > f64::from(max) {
        return None;
    }
    Some(raw as u32)
}

/// Derived numbers for the "today" card.
pub fn today_stats(snapshot: &ReadingProgressSnapshot) -> TodayStats {
    let goal = snapshot.daily_goal.max(1);
    let pages = snapshot.manual_pages_today;
    let percent = (f64::from(pages) / f64::from(goal) * 100.0).round() as u32;

    TodayStats {
        pages_read_today: pages,
        daily_goal: goal,
        remaining_pages: goal.saturating_sub(pages),
        today_progress_percent: percent,
        goal_met: pages >= goal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_boundaries() {
        assert_eq!(validate_pages(0.0).unwrap(), 0);
        assert_eq!(validate_pages(1000.0).unwrap(), 1000);
        assert!(matches!(validate_pages(-1.0), Err(TrackerError::InvalidPages(_))));
        assert!(matches!(validate_pages(1001.0), Err(TrackerError::InvalidPages(_))));
    }

    #[test]
    fn rejects_non_integer_and_non_finite_pages() {
        assert!(validate_pages(12.5).is_err());
        assert!(validate_pages(f64::NAN).is_err());
        assert!(validate_pages(f64::INFINITY).is_err());
    }

    #[test]
    fn daily_goal_must_be_positive() {
        assert!(matches!(validate_daily_goal(0.0), Err(TrackerError::InvalidDailyGoal(_))));
        assert!(validate_daily_goal(-5.0).is_err());
        assert_eq!(validate_daily_goal(45.0).unwrap(), 45);
    }

    #[test]
    fn stats_report_remaining_and_percent() {
        let mut snapshot = ReadingProgressSnapshot::new("u1");
        snapshot.manual_pages_today = 12;

        let stats = today_stats(&snapshot);
        assert_eq!(stats.pages_read_today, 12);
        assert_eq!(stats.daily_goal, 30);
        assert_eq!(stats.remaining_pages, 18);
        assert_eq!(stats.today_progress_percent, 40);
        assert!(!stats.goal_met);
    }

    #[test]
    fn stats_allow_more_than_one_hundred_percent() {
        let mut snapshot = ReadingProgressSnapshot::new("u1");
        snapshot.manual_pages_today = 45;

        let stats = today_stats(&snapshot);
        assert_eq!(stats.remaining_pages, 0);
        assert_eq!(stats.today_progress_percent, 150);
        assert!(stats.goal_met);
    }

    #[test]
    fn percent_rounds_to_nearest() {
        let mut snapshot = ReadingProgressSnapshot::with_goal("u1", 3);
        snapshot.manual_pages_today = 2;
        assert_eq!(today_stats(&snapshot).today_progress_percent, 67);
    }
}
