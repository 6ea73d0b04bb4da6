use thiserror::Error;

/// Errors produced by the reading-progress tracker and its stores.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Pages must be a whole number between 0 and 1000, got {0}")]
    InvalidPages(f64),

    #[error("Daily goal must be a whole number between 1 and 1000, got {0}")]
    InvalidDailyGoal(f64),

    #[error("Page position must be a non-negative whole number, got {0}")]
    InvalidPagePosition(f64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TrackerError::InvalidPages(_)
                | TrackerError::InvalidDailyGoal(_)
                | TrackerError::InvalidPagePosition(_)
        )
    }

    /// Short message suitable for showing inline next to the input that failed.
    pub fn user_message(&self) -> &'static str {
        match self {
            TrackerError::InvalidPages(_) => "Enter 0–1000",
            TrackerError::InvalidDailyGoal(_) => "Enter a goal of 1–1000",
            TrackerError::InvalidPagePosition(_) => "Enter a valid page number",
            TrackerError::Database(_)
            | TrackerError::Persistence(_)
            | TrackerError::Serialization(_)
            | TrackerError::Io(_) => "Could not save your progress. Please try again.",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
