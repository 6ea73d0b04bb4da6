use crate::error::Result;
use crate::models::session::ReadingSessionEvent;
use crate::models::snapshot::{ReadingProgressSnapshot, DEFAULT_DAILY_GOAL, WINDOW_DAYS};
use crate::store::{SessionLogStore, SnapshotStore};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::fs;
use std::path::Path;

const DB_SCHEMA_VERSION: i64 = 3;
const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )?;

    let mut version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    if version < 1 {
        apply_migration_1(conn)?;
        version = 1;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 2 {
        apply_migration_2(conn)?;
        version = 2;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version < 3 {
        apply_migration_3(conn)?;
        version = 3;
        conn.pragma_update(None, "user_version", version)?;
    }

    if version > DB_SCHEMA_VERSION {
        // Written by a newer build; keep going, newer columns are ignored.
        log::warn!("state.db schema version {version} is newer than {DB_SCHEMA_VERSION}");
    }

    Ok(())
}

fn apply_migration_1(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS reading_progress (
            user_id TEXT PRIMARY KEY,
            days_json TEXT NOT NULL DEFAULT '[0,0,0,0,0,0,0]',
            manual_pages_today INTEGER NOT NULL DEFAULT 0,
            daily_goal INTEGER NOT NULL DEFAULT 30,
            streak INTEGER NOT NULL DEFAULT 0,
            last_updated_date TEXT,
            updated_at INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS reading_sessions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            pages_read INTEGER NOT NULL,
            logged_at INTEGER NOT NULL
        );
        ",
    )
}

fn apply_migration_2(conn: &Connection) -> rusqlite::Result<()> {
    add_column_if_missing(conn, "reading_progress", "total_pages_read INTEGER NOT NULL DEFAULT 0")?;

    // Backfill the aggregate for rows written before the column existed.
    let mut stmt = conn.prepare("SELECT user_id, days_json FROM reading_progress")?;
    let rows: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .filter_map(|r| r.ok())
        .collect();

    for (user_id, days_json) in rows {
        let total: u32 = parse_days(&days_json).iter().fold(0u32, |acc, d| acc.saturating_add(*d));
        conn.execute(
            "UPDATE reading_progress SET total_pages_read = ?2 WHERE user_id = ?1",
            params![user_id, total],
        )?;
    }

    Ok(())
}

fn apply_migration_3(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_reading_sessions_user_logged_at ON reading_sessions(user_id, logged_at);
        ",
    )
}

fn add_column_if_missing(conn: &Connection, table: &str, column_def: &str) -> rusqlite::Result<()> {
    let column_name = column_def
        .split_whitespace()
        .next()
        .unwrap_or(column_def)
        .to_string();

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .filter_map(|res| res.ok())
        .any(|name| name == column_name);

    if !exists {
        conn.execute(&format!("ALTER TABLE {table} ADD COLUMN {column_def}"), [])?;
    }

    Ok(())
}

pub fn get_db_connection(data_dir: &str) -> Result<Connection> {
    let dir = Path::new(data_dir).join(".shelfmark");
    fs::create_dir_all(&dir)?;
    let conn = Connection::open(dir.join("state.db"))?;
    initialize_schema(&conn)?;
    Ok(conn)
}

/// Reads a persisted day window. Bad or missing entries become 0 so the
/// window always has seven non-negative values.
pub fn parse_days(raw: &str) -> [u32; WINDOW_DAYS] {
    let mut days = [0u32; WINDOW_DAYS];
    let Ok(Value::Array(values)) = serde_json::from_str::<Value>(raw) else {
        return days;
    };

    for (slot, value) in days.iter_mut().zip(values.iter()) {
        *slot = coerce_pages(value);
    }
    days
}

fn coerce_pages(value: &Value) -> u32 {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(f64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

/// SQLite-backed snapshot and session stores, one connection per command.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(data_dir: &str) -> Result<Self> {
        Ok(Self::new(get_db_connection(data_dir)?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn load_total_pages_read(&self, user_id: &str) -> Result<Option<u32>> {
        let total = self
            .conn
            .query_row(
                "SELECT total_pages_read FROM reading_progress WHERE user_id = ?1",
                params![user_id],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(total.map(clamp_u32))
    }

    /// Most recent session events first.
    pub fn list_sessions(&self, user_id: &str, limit: usize) -> Result<Vec<ReadingSessionEvent>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, pages_read, logged_at FROM reading_sessions WHERE user_id = ?1 ORDER BY logged_at DESC, id DESC LIMIT ?2",
        )?;

        let sessions = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let logged_at: i64 = row.get(2)?;
                Ok(ReadingSessionEvent {
                    user_id: row.get(0)?,
                    pages_read: row.get(1)?,
                    logged_at: DateTime::from_timestamp(logged_at, 0).unwrap_or_default(),
                })
            })?
            .filter_map(|r| r.ok())
            .collect();

        Ok(sessions)
    }
}

impl SnapshotStore for SqliteStore {
    fn read(&self, user_id: &str) -> Result<Option<ReadingProgressSnapshot>> {
        let snapshot = self
            .conn
            .query_row(
                "SELECT user_id, days_json, manual_pages_today, daily_goal, streak, last_updated_date FROM reading_progress WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let days_json: String = row.get(1)?;
                    let daily_goal: i64 = row.get(3)?;
                    let last_updated: Option<String> = row.get(5)?;

                    Ok(ReadingProgressSnapshot {
                        user_id: row.get(0)?,
                        days: parse_days(&days_json),
                        manual_pages_today: clamp_u32(row.get(2)?),
                        daily_goal: if daily_goal > 0 {
                            clamp_u32(daily_goal)
                        } else {
                            DEFAULT_DAILY_GOAL
                        },
                        streak: clamp_u32(row.get(4)?),
                        last_updated_date: last_updated
                            .and_then(|d| NaiveDate::parse_from_str(d.trim(), DATE_FORMAT).ok()),
                    })
                },
            )
            .optional()?;

        Ok(snapshot)
    }

    fn write(&self, snapshot: &ReadingProgressSnapshot) -> Result<()> {
        let days_json = serde_json::to_string(&snapshot.days)?;
        let last_updated = snapshot
            .last_updated_date
            .map(|d| d.format(DATE_FORMAT).to_string());
        let now = Utc::now().timestamp();

        self.conn.execute(
            "
            INSERT INTO reading_progress (
                user_id,
                days_json,
                manual_pages_today,
                daily_goal,
                streak,
                last_updated_date,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                days_json = excluded.days_json,
                manual_pages_today = excluded.manual_pages_today,
                daily_goal = excluded.daily_goal,
                streak = excluded.streak,
                last_updated_date = excluded.last_updated_date,
                updated_at = excluded.updated_at
            ",
            params![
                snapshot.user_id,
                days_json,
                snapshot.manual_pages_today,
                snapshot.daily_goal,
                snapshot.streak,
                last_updated,
                now,
            ],
        )?;

        Ok(())
    }

    fn write_total_pages_read(&self, user_id: &str, total: u32) -> Result<()> {
        self.conn.execute(
            "INSERT INTO reading_progress (user_id, total_pages_read, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET total_pages_read = excluded.total_pages_read, updated_at = excluded.updated_at",
            params![user_id, total, Utc::now().timestamp()],
        )?;
        Ok(())
    }
}

impl SessionLogStore for SqliteStore {
    fn append(&self, event: &ReadingSessionEvent) -> Result<()> {
        self.conn.execute(
            "INSERT INTO reading_sessions (user_id, pages_read, logged_at) VALUES (?1, ?2, ?3)",
            params![event.user_id, event.pages_read, event.logged_at.timestamp()],
        )?;
        Ok(())
    }
}
