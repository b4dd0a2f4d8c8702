use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::LogIssue;

/// Total sleep minutes per calendar date, as stated by the log's own
/// "睡眠合計" lines. Keys iterate in ascending date order.
pub type DailyTotals = BTreeMap<NaiveDate, u32>;

/// One closed sleep period: a "寝る" event later matched by an "起きる" event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepSession {
    /// Calendar date on which the sleep began.
    pub date: NaiveDate,
    /// Wall-clock time the sleep began.
    #[serde(with = "hhmm")]
    pub sleep_time: NaiveTime,
    /// Wall-clock time of waking, possibly on a later date.
    #[serde(with = "hhmm")]
    pub wake_time: NaiveTime,
    /// Length of the sleep, `1..=1440`.
    pub duration_minutes: u32,
}

/// The merged result of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Sessions ordered by date; sessions sharing a date keep log order.
    pub sessions: Vec<SleepSession>,
    /// Per-date totals from the log's summary lines.
    pub daily_totals: DailyTotals,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Distinct session dates, ascending.
    pub fn session_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.sessions.iter().map(|s| s.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }
}

/// How serious a [`Diagnostic`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A recovered, non-fatal finding about the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based line number in the combined text, or 0 for whole-input findings.
    pub line: usize,
    pub severity: Severity,
    pub issue: LogIssue,
}

impl Diagnostic {
    pub fn warning(line: usize, issue: LogIssue) -> Self {
        Self {
            line,
            severity: Severity::Warning,
            issue,
        }
    }

    /// Human-readable message for logs and UI.
    pub fn message(&self) -> String {
        if self.line == 0 {
            self.issue.to_string()
        } else {
            format!("line {}: {}", self.line, self.issue)
        }
    }
}

/// The raw text of one pasted period (one input tab).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInput {
    pub name: String,
    pub text: String,
}

impl TabInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Whether a tab contributed any text to the combined log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    Empty,
    Loaded,
}

/// Per-tab outcome of the merge step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabReport {
    pub name: String,
    pub status: TabStatus,
}

/// A calendar month, e.g. the period covered by one exported log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike as _;
        Self::new(date.year(), date.month())
    }

    /// The month immediately after this one.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Serde adapter storing a [`NaiveTime`] as `"HH:MM"`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(date: &str, sleep: &str, wake: &str, minutes: u32) -> SleepSession {
        SleepSession {
            date: date.parse().unwrap(),
            sleep_time: NaiveTime::parse_from_str(sleep, "%H:%M").unwrap(),
            wake_time: NaiveTime::parse_from_str(wake, "%H:%M").unwrap(),
            duration_minutes: minutes,
        }
    }

    #[test]
    fn test_session_serializes_clock_times_as_hhmm() {
        let s = session("2024-07-01", "01:00", "06:15", 315);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["date"], "2024-07-01");
        assert_eq!(json["sleep_time"], "01:00");
        assert_eq!(json["wake_time"], "06:15");
        assert_eq!(json["duration_minutes"], 315);

        let back: SleepSession = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_session_dates_distinct_sorted() {
        let dataset = Dataset {
            sessions: vec![
                session("2024-07-02", "13:00", "14:00", 60),
                session("2024-07-01", "01:00", "02:00", 60),
                session("2024-07-02", "20:00", "23:00", 180),
            ],
            daily_totals: DailyTotals::new(),
        };
        let dates = dataset.session_dates();
        assert_eq!(
            dates,
            vec![
                "2024-07-01".parse::<NaiveDate>().unwrap(),
                "2024-07-02".parse::<NaiveDate>().unwrap()
            ]
        );
    }

    #[test]
    fn test_year_month_next_rolls_over_year() {
        assert_eq!(YearMonth::new(2024, 12).next(), YearMonth::new(2025, 1));
        assert_eq!(YearMonth::new(2024, 6).next(), YearMonth::new(2024, 7));
    }

    #[test]
    fn test_diagnostic_message_includes_line() {
        let d = Diagnostic::warning(
            7,
            LogIssue::InvalidTime {
                hour: 24,
                minute: 0,
            },
        );
        assert_eq!(d.message(), "line 7: Invalid time skipped: 24:00");
        assert_eq!(d.severity, Severity::Warning);
    }
}
