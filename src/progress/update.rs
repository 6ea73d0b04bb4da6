use crate::error::{Result, TrackerError};
use crate::models::progress::{LogMode, LogOutcome};
use crate::models::snapshot::{ReadingProgressSnapshot, WINDOW_DAYS};
use crate::progress::goals::{validate_daily_goal, validate_pages, whole_in_range};
use crate::progress::window::{project, roll_forward};
use chrono::NaiveDate;

/// Records `pages` for today, either as today's new total or added to it.
///
/// The window is reconciled first so a log after an absence never lands in a
/// stale slot. On validation failure `snapshot` is untouched and nothing is returned.
pub fn log_pages(
    snapshot: &ReadingProgressSnapshot,
    pages: f64,
    mode: LogMode,
    today: NaiveDate,
) -> Result<LogOutcome> {
    let pages = validate_pages(pages)?;

    let mut next = snapshot.clone();
    let shifted = roll_forward(&mut next, today);

    // After a shift manual_pages_today is 0, so Delta starts the fresh day from `pages`.
    let previous = next.manual_pages_today;
    let updated = match mode {
        LogMode::Absolute => pages,
        LogMode::Delta => previous.saturating_add(pages),
    };

    next.manual_pages_today = updated;
    next.days[WINDOW_DAYS - 1] = updated;
    next.last_updated_date = Some(today);

    Ok(LogOutcome {
        pages_delta: i64::from(updated) - i64::from(previous),
        refresh_stats: true,
        state: project(next, shifted, today),
    })
}

/// "Goals" entry point: today's count becomes exactly `pages`.
pub fn log_pages_read_today(
    snapshot: &ReadingProgressSnapshot,
    pages: f64,
    today: NaiveDate,
) -> Result<LogOutcome> {
    log_pages(snapshot, pages, LogMode::Absolute, today)
}

/// Page-position entry point ("I'm now on page 214").
///
/// Moving forward logs the difference as a delta. Staying put or paging back
/// logs nothing, though the window is still reconciled.
pub fn record_page_position(
    snapshot: &ReadingProgressSnapshot,
    previous_page: f64,
    new_page: f64,
    today: NaiveDate,
) -> Result<LogOutcome> {
    let previous_page = page_position(previous_page)?;
    let new_page = page_position(new_page)?;

    let delta = i64::from(new_page) - i64::from(previous_page);
    if delta > 0 {
        return log_pages(snapshot, delta as f64, LogMode::Delta, today);
    }

    let mut next = snapshot.clone();
    let shifted = roll_forward(&mut next, today);
    Ok(LogOutcome {
        pages_delta: 0,
        refresh_stats: shifted,
        state: project(next, shifted, today),
    })
}

/// Changes the pages/day target. The streak is left alone; it is re-evaluated
/// against the new goal when the current day closes.
pub fn set_daily_goal(
    snapshot: &ReadingProgressSnapshot,
    goal: f64,
    today: NaiveDate,
) -> Result<LogOutcome> {
    let goal = validate_daily_goal(goal)?;

    let mut next = snapshot.clone();
    let shifted = roll_forward(&mut next, today);
    next.daily_goal = goal;
    next.last_updated_date = Some(today);

    Ok(LogOutcome {
        pages_delta: 0,
        refresh_stats: true,
        state: project(next, shifted, today),
    })
}

fn page_position(raw: f64) -> Result<u32> {
    whole_in_range(raw, 0, u32::MAX).ok_or(TrackerError::InvalidPagePosition(raw))
}
