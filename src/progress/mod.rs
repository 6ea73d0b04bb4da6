//! Reading-progress tracker: pure reconciliation of the rolling 7-day window
//! plus the update operations the UI layer calls into. Nothing in here does I/O;
//! the command layer reads the snapshot, calls these, and writes the result back.

pub mod chart;
pub mod goals;
pub mod streak;
pub mod update;
pub mod window;

pub use goals::{today_stats, validate_daily_goal, validate_pages, MAX_PAGES_PER_LOG};
pub use update::{log_pages, log_pages_read_today, record_page_position, set_daily_goal};
pub use window::reconcile;
