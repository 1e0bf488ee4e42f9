//! Error types for suncal.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur in suncal operations.
#[derive(Error, Debug)]
pub enum CalError {
    #[error("Invalid month: {0} (expected 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Year {year} is outside {min}-{max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("No event at index {index} on {date}")]
    InvalidIndex { date: NaiveDate, index: usize },

    #[error("Could not save events to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for suncal operations.
pub type CalResult<T> = Result<T, CalError>;
