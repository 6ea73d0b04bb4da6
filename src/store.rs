//! Collaborators the progress commands depend on. The SQLite adapter lives in
//! `commands::db`; tests swap in their own implementations.

use crate::error::Result;
use crate::models::session::ReadingSessionEvent;
use crate::models::snapshot::ReadingProgressSnapshot;
use chrono::{Local, NaiveDate};

/// Upsert-by-user storage for the full snapshot row. Writes are last-write-wins.
pub trait SnapshotStore {
    fn read(&self, user_id: &str) -> Result<Option<ReadingProgressSnapshot>>;

    fn write(&self, snapshot: &ReadingProgressSnapshot) -> Result<()>;

    /// Aggregate `totalPagesRead` column, written best-effort after a window shift.
    fn write_total_pages_read(&self, user_id: &str, total: u32) -> Result<()>;
}

/// Append-only audit trail of logged pages. Failures are never surfaced to the user.
pub trait SessionLogStore {
    fn append(&self, event: &ReadingSessionEvent) -> Result<()>;
}

/// Source of "today". Sampled once per command.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local calendar date of the device.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
