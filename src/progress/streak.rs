/// Streak after closing out a day that ended with `pages_closed` pages read.
///
/// A qualifying day extends the streak only when it directly follows the
/// previous close (`diff_days == 1`); after a gap it starts a new streak of 1.
/// Missing the goal always resets to 0.
pub fn next_streak(previous: u32, pages_closed: u32, daily_goal: u32, diff_days: i64) -> u32 {
    if pages_closed < daily_goal {
        return 0;
    }

    if diff_days == 1 {
        previous.saturating_add(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_qualifying_day_extends_streak() {
        assert_eq!(next_streak(2, 70, 50, 1), 3);
    }

    #[test]
    fn exactly_meeting_goal_counts() {
        assert_eq!(next_streak(4, 30, 30, 1), 5);
    }

    #[test]
    fn qualifying_day_after_gap_restarts_at_one() {
        assert_eq!(next_streak(9, 80, 50, 3), 1);
        assert_eq!(next_streak(9, 80, 50, 12), 1);
    }

    #[test]
    fn missed_goal_breaks_streak() {
        for diff in [1, 2, 6, 7, 30] {
            assert_eq!(next_streak(5, 10, 30, diff), 0);
        }
    }
}
