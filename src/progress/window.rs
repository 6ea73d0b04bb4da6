use crate::models::progress::ReconciledState;
use crate::models::snapshot::{ReadingProgressSnapshot, WINDOW_DAYS};
use crate::progress::{chart::chart_series, goals::today_stats, streak::next_streak};
use chrono::NaiveDate;

/// Whole calendar days between the last write and `today`.
/// Absent or future dates count as zero so the window is never shifted backwards.
pub fn days_elapsed(last_updated: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match last_updated {
        Some(last) => today.signed_duration_since(last).num_days().max(0),
        None => 0,
    }
}

/// Moves the window forward by `diff_days`, placing `pages_from_last_save` in today's slot.
///
/// A gap of a week or more drops every carried day. Otherwise `days[i + diff]`
/// moves to `days[i]` for `i in 0..=6 - diff`, and slots left without a source stay 0.
pub fn shift_window(
    days: &[u32; WINDOW_DAYS],
    diff_days: i64,
    pages_from_last_save: u32,
) -> [u32; WINDOW_DAYS] {
    let last = WINDOW_DAYS - 1;
    let mut shifted = [0u32; WINDOW_DAYS];

    if diff_days <= 0 {
        return *days;
    }

    if diff_days < WINDOW_DAYS as i64 {
        let diff = diff_days as usize;
        shifted[..WINDOW_DAYS - diff].copy_from_slice(&days[diff..]);
    }

    shifted[last] = pages_from_last_save;
    shifted
}

/// Brings `snapshot` up to `today` in place. Returns true when a day boundary was crossed.
pub(crate) fn roll_forward(snapshot: &mut ReadingProgressSnapshot, today: NaiveDate) -> bool {
    let diff_days = days_elapsed(snapshot.last_updated_date, today);
    if diff_days == 0 {
        return false;
    }

    let pages_from_last_save = snapshot.manual_pages_today;
    if diff_days >= WINDOW_DAYS as i64 {
        log::info!(
            "Resetting reading window for {} after {} idle days",
            snapshot.user_id,
            diff_days
        );
    }

    snapshot.days = shift_window(&snapshot.days, diff_days, pages_from_last_save);
    snapshot.streak = next_streak(
        snapshot.streak,
        pages_from_last_save,
        snapshot.daily_goal,
        diff_days,
    );
    snapshot.manual_pages_today = 0;
    snapshot.last_updated_date = Some(today);

    log::debug!(
        "Shifted reading window for {} by {} day(s), streak now {}",
        snapshot.user_id,
        diff_days,
        snapshot.streak
    );

    true
}

/// Reconciles a persisted snapshot against `today` and derives the chart and today stats.
/// The input is left untouched; persist `state.snapshot` when `state.shifted` is set.
pub fn reconcile(snapshot: &ReadingProgressSnapshot, today: NaiveDate) -> ReconciledState {
    let mut next = snapshot.clone();
    let shifted = roll_forward(&mut next, today);
    project(next, shifted, today)
}

pub(crate) fn project(
    snapshot: ReadingProgressSnapshot,
    shifted: bool,
    today: NaiveDate,
) -> ReconciledState {
    let chart = chart_series(&snapshot.days, today);
    let stats = today_stats(&snapshot);
    ReconciledState {
        snapshot,
        shifted,
        chart,
        stats,
    }
}
