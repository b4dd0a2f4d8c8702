use std::path::PathBuf;
use thiserror::Error;

use crate::models::YearMonth;

/// A problem with a single line of log text.
///
/// These are always recovered locally: the offending line (or the session it
/// would have produced) is skipped and parsing carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogIssue {
    /// A date header whose fields do not form a real calendar date, or whose
    /// year lies outside 1900..=2100.
    #[error("Invalid date skipped: {year}/{month}/{day}")]
    InvalidDate { year: u32, month: u32, day: u32 },

    /// A timed line whose hour or minute is out of range.
    #[error("Invalid time skipped: {hour}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },

    /// A begin/wake pair whose duration is negative or longer than a day.
    #[error("Unresolvable sleep duration dropped: {minutes} minutes")]
    UnresolvedDuration { minutes: i64 },

    /// Two consecutive tabs are more than one month apart.
    #[error("{missing} month(s) missing between {from} and {to}")]
    MonthGap {
        from: YearMonth,
        to: YearMonth,
        missing: i32,
    },
}

/// All errors produced by the piyolog analyzer.
#[derive(Error, Debug)]
pub enum PiyologError {
    /// Every tab was empty; nothing was parsed.
    #[error("No input provided: every log text is empty")]
    NoInputProvided,

    /// Parsing completed but no sleep session could be assembled.
    #[error("No sleep data found in {lines_scanned} line(s) of input")]
    NoSleepDataFound { lines_scanned: usize },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be produced or parsed.
    #[error("Failed to process JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PiyologError {
    /// The message shown to the person who pasted the logs.
    ///
    /// Only the two whole-input failures have dedicated wording; everything
    /// else falls back to the technical `Display` text.
    pub fn user_message(&self) -> String {
        match self {
            PiyologError::NoInputProvided => "有効なデータが入力されていません".to_string(),
            PiyologError::NoSleepDataFound { .. } => {
                "有効な睡眠データが見つかりませんでした。正しいぴよログの形式で入力してください。"
                    .to_string()
            }
            other => other.to_string(),
        }
    }

    /// Whether this failure stems from the pasted content rather than the
    /// environment.
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            PiyologError::NoInputProvided | PiyologError::NoSleepDataFound { .. }
        )
    }
}

/// Convenience alias used throughout the piyolog crates.
pub type Result<T> = std::result::Result<T, PiyologError>;
