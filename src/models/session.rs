use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single pages-read delta, appended to the session log after a log operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSessionEvent {
    pub user_id: String,
    pub pages_read: i64,
    pub logged_at: DateTime<Utc>,
}
