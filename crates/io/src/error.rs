//! Error types for kca-io.

use std::path::PathBuf;

use chrono::NaiveDate;

/// Error type for all fallible operations in the kca-io crate.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when the input file does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error from the CSV parser or the underlying reader.
    #[error("csv error: {reason}")]
    Csv {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a required column is absent from the header row.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// File that was inspected.
        path: PathBuf,
    },

    /// Returned when a date cell cannot be parsed.
    #[error("invalid date '{value}' on line {line}")]
    InvalidDate {
        /// The raw cell.
        value: String,
        /// 1-based line number in the file.
        line: u64,
    },

    /// Returned when a value cell is neither a number nor a missing marker.
    #[error("invalid value '{value}' on line {line}")]
    InvalidValue {
        /// The raw cell.
        value: String,
        /// 1-based line number in the file.
        line: u64,
    },

    /// Returned when two rows carry the same date.
    #[error("duplicate date {date}")]
    DuplicateDate {
        /// The repeated date.
        date: NaiveDate,
    },

    /// Returned when the requested window is empty.
    #[error("invalid date range: start {start} must precede end {end}")]
    InvalidRange {
        /// Inclusive start.
        start: NaiveDate,
        /// Exclusive end.
        end: NaiveDate,
    },

    /// Returned when no rows survive filtering.
    #[error("no prices found in {}", path.display())]
    Empty {
        /// File that was read.
        path: PathBuf,
    },
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv {
            reason: e.to_string(),
        }
    }
}
