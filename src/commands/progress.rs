use crate::commands::db::SqliteStore;
use crate::commands::settings::{load_effective_tracker_settings, TrackerSettings};
use crate::error::TrackerError;
use crate::models::progress::{LogMode, LogOutcome, ReconciledState};
use crate::models::session::ReadingSessionEvent;
use crate::models::snapshot::ReadingProgressSnapshot;
use crate::progress;
use crate::store::{Clock, SessionLogStore, SnapshotStore, SystemClock};
use chrono::Utc;

const DEFAULT_SESSION_LIMIT: usize = 50;

#[cfg_attr(feature = "app", tauri::command)]
pub async fn get_reading_progress(data_dir: String, user_id: String) -> Result<ReconciledState, String> {
    let settings = load_effective_tracker_settings(&data_dir)?;
    let store = SqliteStore::open(&data_dir).map_err(command_error)?;
    get_reading_progress_internal(&store, &SystemClock, &settings, &user_id).map_err(command_error)
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn log_pages_read_today(
    data_dir: String,
    user_id: String,
    pages: f64,
) -> Result<LogOutcome, String> {
    log_pages(data_dir, user_id, pages, LogMode::Absolute).await
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn log_pages(
    data_dir: String,
    user_id: String,
    pages: f64,
    mode: LogMode,
) -> Result<LogOutcome, String> {
    let settings = load_effective_tracker_settings(&data_dir)?;
    let store = SqliteStore::open(&data_dir).map_err(command_error)?;
    log_pages_internal(&store, &store, &SystemClock, &settings, &user_id, pages, mode)
        .map_err(command_error)
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn update_page_position(
    data_dir: String,
    user_id: String,
    previous_page: f64,
    new_page: f64,
) -> Result<LogOutcome, String> {
    let settings = load_effective_tracker_settings(&data_dir)?;
    let store = SqliteStore::open(&data_dir).map_err(command_error)?;
    update_page_position_internal(
        &store,
        &store,
        &SystemClock,
        &settings,
        &user_id,
        previous_page,
        new_page,
    )
    .map_err(command_error)
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn set_daily_goal(data_dir: String, user_id: String, goal: f64) -> Result<LogOutcome, String> {
    let settings = load_effective_tracker_settings(&data_dir)?;
    let store = SqliteStore::open(&data_dir).map_err(command_error)?;
    set_daily_goal_internal(&store, &SystemClock, &settings, &user_id, goal).map_err(command_error)
}

#[cfg_attr(feature = "app", tauri::command)]
pub async fn get_reading_sessions(
    data_dir: String,
    user_id: String,
    limit: Option<usize>,
) -> Result<Vec<ReadingSessionEvent>, String> {
    let store = SqliteStore::open(&data_dir).map_err(command_error)?;
    store
        .list_sessions(&user_id, limit.unwrap_or(DEFAULT_SESSION_LIMIT))
        .map_err(command_error)
}

pub fn get_reading_progress_internal<S: SnapshotStore>(
    store: &S,
    clock: &impl Clock,
    settings: &TrackerSettings,
    user_id: &str,
) -> Result<ReconciledState, TrackerError> {
    let snapshot = load_snapshot(store, settings, user_id)?;
    let state = progress::reconcile(&snapshot, clock.today());

    if state.shifted {
        store.write(&state.snapshot)?;
        write_total_best_effort(store, &state.snapshot);
    }

    Ok(state)
}

pub fn log_pages_internal<S: SnapshotStore, L: SessionLogStore>(
    store: &S,
    sessions: &L,
    clock: &impl Clock,
    settings: &TrackerSettings,
    user_id: &str,
    pages: f64,
    mode: LogMode,
) -> Result<LogOutcome, TrackerError> {
    let snapshot = load_snapshot(store, settings, user_id)?;
    let outcome = progress::log_pages(&snapshot, pages, mode, clock.today())?;
    persist_outcome(store, sessions, settings, &snapshot, &outcome)?;
    Ok(outcome)
}

pub fn update_page_position_internal<S: SnapshotStore, L: SessionLogStore>(
    store: &S,
    sessions: &L,
    clock: &impl Clock,
    settings: &TrackerSettings,
    user_id: &str,
    previous_page: f64,
    new_page: f64,
) -> Result<LogOutcome, TrackerError> {
    let snapshot = load_snapshot(store, settings, user_id)?;
    let outcome = progress::record_page_position(&snapshot, previous_page, new_page, clock.today())?;
    persist_outcome(store, sessions, settings, &snapshot, &outcome)?;
    Ok(outcome)
}

pub fn set_daily_goal_internal<S: SnapshotStore>(
    store: &S,
    clock: &impl Clock,
    settings: &TrackerSettings,
    user_id: &str,
    goal: f64,
) -> Result<LogOutcome, TrackerError> {
    let snapshot = load_snapshot(store, settings, user_id)?;
    let outcome = progress::set_daily_goal(&snapshot, goal, clock.today())?;

    store.write(&outcome.state.snapshot)?;
    if outcome.state.shifted {
        write_total_best_effort(store, &outcome.state.snapshot);
    }

    Ok(outcome)
}

fn load_snapshot<S: SnapshotStore>(
    store: &S,
    settings: &TrackerSettings,
    user_id: &str,
) -> Result<ReadingProgressSnapshot, TrackerError> {
    Ok(store
        .read(user_id)?
        .unwrap_or_else(|| ReadingProgressSnapshot::with_goal(user_id, settings.default_daily_goal)))
}

fn persist_outcome<S: SnapshotStore, L: SessionLogStore>(
    store: &S,
    sessions: &L,
    settings: &TrackerSettings,
    previous: &ReadingProgressSnapshot,
    outcome: &LogOutcome,
) -> Result<(), TrackerError> {
    let next = &outcome.state.snapshot;
    if next != previous {
        store.write(next)?;
    }

    if outcome.state.shifted {
        write_total_best_effort(store, next);
    }

    if settings.session_log_enabled && outcome.pages_delta != 0 {
        let event = ReadingSessionEvent {
            user_id: next.user_id.clone(),
            pages_read: outcome.pages_delta,
            logged_at: Utc::now(),
        };
        if let Err(e) = sessions.append(&event) {
            log::warn!("Failed to append reading session for {}: {e}", next.user_id);
        }
    }

    Ok(())
}

fn write_total_best_effort<S: SnapshotStore>(store: &S, snapshot: &ReadingProgressSnapshot) {
    if let Err(e) = store.write_total_pages_read(&snapshot.user_id, snapshot.total_pages_read()) {
        log::warn!("Failed to update total pages read for {}: {e}", snapshot.user_id);
    }
}

/// Validation errors become the inline hint; everything else the generic retry prompt.
fn command_error(err: TrackerError) -> String {
    if !err.is_validation() {
        log::error!("Reading progress command failed: {err}");
    }
    err.user_message().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FixedClock;
    use chrono::{Duration, NaiveDate};
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore {
        rows: RefCell<HashMap<String, ReadingProgressSnapshot>>,
        totals: RefCell<HashMap<String, u32>>,
        sessions: RefCell<Vec<ReadingSessionEvent>>,
        writes: Cell<usize>,
        fail_writes: bool,
        fail_side_writes: bool,
    }

    impl SnapshotStore for MemoryStore {
        fn read(&self, user_id: &str) -> Result<Option<ReadingProgressSnapshot>, TrackerError> {
            Ok(self.rows.borrow().get(user_id).cloned())
        }

        fn write(&self, snapshot: &ReadingProgressSnapshot) -> Result<(), TrackerError> {
            if self.fail_writes {
                return Err(TrackerError::Persistence("offline".to_string()));
            }
            self.writes.set(self.writes.get() + 1);
            self.rows
                .borrow_mut()
                .insert(snapshot.user_id.clone(), snapshot.clone());
            Ok(())
        }

        fn write_total_pages_read(&self, user_id: &str, total: u32) -> Result<(), TrackerError> {
            if self.fail_side_writes {
                return Err(TrackerError::Persistence("offline".to_string()));
            }
            self.totals.borrow_mut().insert(user_id.to_string(), total);
            Ok(())
        }
    }

    impl SessionLogStore for MemoryStore {
        fn append(&self, event: &ReadingSessionEvent) -> Result<(), TrackerError> {
            if self.fail_side_writes {
                return Err(TrackerError::Persistence("offline".to_string()));
            }
            self.sessions.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
    }

    fn seeded(store: &MemoryStore, days_ago: i64) {
        store.rows.borrow_mut().insert(
            "reader-1".to_string(),
            ReadingProgressSnapshot {
                user_id: "reader-1".to_string(),
                days: [10, 20, 30, 40, 50, 60, 70],
                manual_pages_today: 70,
                daily_goal: 50,
                streak: 2,
                last_updated_date: Some(clock().0 - Duration::days(days_ago)),
            },
        );
    }

    #[test]
    fn missing_snapshot_uses_configured_goal_without_writing() {
        let store = MemoryStore::default();
        let settings = TrackerSettings {
            default_daily_goal: 40,
            ..TrackerSettings::default()
        };

        let state = get_reading_progress_internal(&store, &clock(), &settings, "new-reader").unwrap();

        assert_eq!(state.snapshot.daily_goal, 40);
        assert_eq!(state.snapshot.days, [0; 7]);
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn shift_is_written_back_with_total() {
        let store = MemoryStore::default();
        seeded(&store, 1);

        let state =
            get_reading_progress_internal(&store, &clock(), &TrackerSettings::default(), "reader-1").unwrap();

        assert!(state.shifted);
        assert_eq!(store.writes.get(), 1);
        assert_eq!(store.rows.borrow()["reader-1"].days, [20, 30, 40, 50, 60, 70, 70]);
        assert_eq!(store.totals.borrow()["reader-1"], 340);
    }

    #[test]
    fn total_write_failure_does_not_fail_reconcile() {
        let store = MemoryStore {
            fail_side_writes: true,
            ..MemoryStore::default()
        };
        seeded(&store, 2);

        let state =
            get_reading_progress_internal(&store, &clock(), &TrackerSettings::default(), "reader-1").unwrap();
        assert!(state.shifted);
        assert!(store.totals.borrow().is_empty());
    }

    #[test]
    fn snapshot_write_failure_is_reported() {
        let store = MemoryStore {
            fail_writes: true,
            ..MemoryStore::default()
        };
        seeded(&store, 1);

        let err = log_pages_internal(
            &store,
            &store,
            &clock(),
            &TrackerSettings::default(),
            "reader-1",
            10.0,
            LogMode::Absolute,
        )
        .unwrap_err();

        assert!(matches!(err, TrackerError::Persistence(_)));
        assert_eq!(command_error(err), "Could not save your progress. Please try again.");
    }

    #[test]
    fn log_appends_session_event() {
        let store = MemoryStore::default();
        seeded(&store, 0);

        let outcome = log_pages_internal(
            &store,
            &store,
            &clock(),
            &TrackerSettings::default(),
            "reader-1",
            5.0,
            LogMode::Delta,
        )
        .unwrap();

        assert_eq!(outcome.state.snapshot.manual_pages_today, 75);
        let sessions = store.sessions.borrow();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].pages_read, 5);
    }

    #[test]
    fn session_log_can_be_disabled() {
        let store = MemoryStore::default();
        let settings = TrackerSettings {
            session_log_enabled: false,
            ..TrackerSettings::default()
        };

        log_pages_internal(&store, &store, &clock(), &settings, "reader-1", 5.0, LogMode::Absolute).unwrap();
        assert!(store.sessions.borrow().is_empty());
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn session_failure_is_swallowed() {
        let store = MemoryStore {
            fail_side_writes: true,
            ..MemoryStore::default()
        };

        let outcome = log_pages_internal(
            &store,
            &store,
            &clock(),
            &TrackerSettings::default(),
            "reader-1",
            5.0,
            LogMode::Absolute,
        );
        assert!(outcome.is_ok());
    }

    #[test]
    fn invalid_pages_do_not_touch_the_store() {
        let store = MemoryStore::default();
        seeded(&store, 3);

        let err = log_pages_internal(
            &store,
            &store,
            &clock(),
            &TrackerSettings::default(),
            "reader-1",
            1001.0,
            LogMode::Absolute,
        )
        .unwrap_err();

        assert_eq!(command_error(err), "Enter 0–1000");
        assert_eq!(store.writes.get(), 0);
        assert!(store.sessions.borrow().is_empty());
    }

    #[test]
    fn paging_backwards_on_same_day_skips_write() {
        let store = MemoryStore::default();
        seeded(&store, 0);

        let outcome = update_page_position_internal(
            &store,
            &store,
            &clock(),
            &TrackerSettings::default(),
            "reader-1",
            120.0,
            100.0,
        )
        .unwrap();

        assert_eq!(outcome.pages_delta, 0);
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn goal_update_persists() {
        let store = MemoryStore::default();
        seeded(&store, 0);

        set_daily_goal_internal(&store, &clock(), &TrackerSettings::default(), "reader-1", 25.0).unwrap();
        assert_eq!(store.rows.borrow()["reader-1"].daily_goal, 25);
    }
}
