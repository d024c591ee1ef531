//! Domain error types.

use chrono::{NaiveDate, NaiveTime};

/// Invalid simulation parameters. Raised before any bar is simulated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be in (0, {max}], got {value}")]
    InvalidPercentage {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("trail_trigger_pct and trail_lock_pct must be set together (missing {missing})")]
    MismatchedTrailing { missing: &'static str },

    #[error("invalid reentry_mode {0:?} (expected IMMEDIATE or DELAYED)")]
    InvalidReentryMode(String),

    #[error("reentry_delay must be a positive number of bars when reentry_mode is DELAYED")]
    MissingReentryDelay,

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Unusable bar stream. Raised before any bar is simulated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataError {
    #[error("bar stream is empty")]
    EmptyBarStream,

    #[error(
        "bars out of order at index {index}: {date} {time} does not follow {prev_date} {prev_time}"
    )]
    NonMonotonic {
        index: usize,
        prev_date: NaiveDate,
        prev_time: NaiveTime,
        date: NaiveDate,
        time: NaiveTime,
    },

    #[error("bar {index} ({date} {time}) is missing indicator {field}")]
    MissingIndicator {
        index: usize,
        date: NaiveDate,
        time: NaiveTime,
        field: &'static str,
    },

    #[error("bar {index} ({date} {time}) has invalid prices: {reason}")]
    InvalidPrice {
        index: usize,
        date: NaiveDate,
        time: NaiveTime,
        reason: String,
    },
}

/// Top-level error type for tradesim.
#[derive(Debug, thiserror::Error)]
pub enum TradesimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("csv error: {reason}")]
    Csv { reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradesimError> for std::process::ExitCode {
    fn from(err: &TradesimError) -> Self {
        let code: u8 = match err {
            TradesimError::Io(_) => 1,
            TradesimError::Config(_) | TradesimError::ConfigParse { .. } => 2,
            TradesimError::Data(_) | TradesimError::Csv { .. } => 3,
            TradesimError::Report { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
