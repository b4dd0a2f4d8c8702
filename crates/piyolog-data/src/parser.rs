//! Line-oriented parser for piyolog text exports.
//!
//! Each trimmed line is classified as a date header, a sleep-total line, a
//! timed activity line or noise. The scan is a fold over [`ParseState`]: the
//! state carries the current date and at most one pending "寝る" marker that
//! a later "起きる" line closes into a [`SleepSession`].

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use piyolog_core::models::{DailyTotals, Dataset, Diagnostic, SleepSession};
use piyolog_core::time_utils::{elapsed_minutes, validate_date, validate_time, MINUTES_PER_DAY};
use piyolog_core::LogIssue;
use regex::Regex;
use tracing::{debug, warn};

/// Activity token that opens a sleep.
pub const SLEEP_MARKER: &str = "寝る";
/// Activity token that closes a sleep.
pub const WAKE_MARKER: &str = "起きる";

// ── Line classification ───────────────────────────────────────────────────────

/// What a single trimmed line of log text means to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine<'a> {
    /// `YYYY/M/D(曜日)`; the fields are not yet validated.
    DateHeader { year: u32, month: u32, day: u32 },
    /// `睡眠合計 H時間M分`.
    SleepTotal { hours: u32, minutes: u32 },
    /// `H:MM activity`; the clock fields are not yet validated.
    Timed {
        hour: u32,
        minute: u32,
        activity: &'a str,
    },
    Other,
}

fn date_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([0-9]{4})/([0-9]{1,2})/([0-9]{1,2})\([^)]+\)").expect("regex is valid")
    })
}

fn sleep_total_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"睡眠合計\s+([0-9]+)時間([0-9]+)分").expect("regex is valid"))
}

fn timed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([0-9]{1,2}):([0-9]{2})\s+(.+)").expect("regex is valid"))
}

fn inline_duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([0-9]+)時間([0-9]+)分\)").expect("regex is valid"))
}

/// Classify one trimmed line. Date headers take priority over sleep totals,
/// which take priority over timed lines.
pub fn classify(line: &str) -> LogLine<'_> {
    if let Some(cap) = date_header_re().captures(line) {
        if let (Ok(year), Ok(month), Ok(day)) =
            (cap[1].parse::<u32>(), cap[2].parse::<u32>(), cap[3].parse::<u32>())
        {
            return LogLine::DateHeader { year, month, day };
        }
    }

    if let Some(cap) = sleep_total_re().captures(line) {
        if let (Ok(hours), Ok(minutes)) = (cap[1].parse::<u32>(), cap[2].parse::<u32>()) {
            return LogLine::SleepTotal { hours, minutes };
        }
    }

    if let Some(cap) = timed_re().captures(line) {
        if let (Ok(hour), Ok(minute), Some(activity)) =
            (cap[1].parse::<u32>(), cap[2].parse::<u32>(), cap.get(3))
        {
            return LogLine::Timed {
                hour,
                minute,
                activity: activity.as_str(),
            };
        }
    }

    LogLine::Other
}

/// Minutes stated by an inline `(H時間M分)` annotation, if present.
fn inline_duration(activity: &str) -> Option<i64> {
    let cap = inline_duration_re().captures(activity)?;
    let hours: i64 = cap[1].parse().ok()?;
    let minutes: i64 = cap[2].parse().ok()?;
    hours.checked_mul(60)?.checked_add(minutes)
}

// ── ParseState ────────────────────────────────────────────────────────────────

/// A "寝る" event still waiting for its "起きる".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSleep {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Accumulator threaded through the line scan.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    current_date: Option<NaiveDate>,
    pending: Option<PendingSleep>,
    sessions: Vec<SleepSession>,
    daily_totals: DailyTotals,
    diagnostics: Vec<Diagnostic>,
    lines_scanned: usize,
}

impl ParseState {
    /// Date of the last valid header, `None` before the first one or after
    /// an invalid one.
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_date
    }

    pub fn pending(&self) -> Option<PendingSleep> {
        self.pending
    }

    pub fn sessions(&self) -> &[SleepSession] {
        &self.sessions
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume one raw line (1-based `line_no`) and return the next state.
    pub fn step(mut self, line_no: usize, raw: &str) -> Self {
        self.lines_scanned += 1;

        let line = raw.trim();
        if line.is_empty() {
            return self;
        }

        match classify(line) {
            LogLine::DateHeader { year, month, day } => self.enter_date(line_no, year, month, day),
            LogLine::SleepTotal { hours, minutes } => self.record_total(hours, minutes),
            LogLine::Timed {
                hour,
                minute,
                activity,
            } => self.record_activity(line_no, hour, minute, activity),
            LogLine::Other => {}
        }
        self
    }

    /// Sort the collected sessions by date and hand back the result.
    pub fn finish(mut self) -> ParsedLog {
        // Stable: sessions on the same date keep their log order.
        self.sessions.sort_by_key(|s| s.date);
        ParsedLog {
            sessions: self.sessions,
            daily_totals: self.daily_totals,
            diagnostics: self.diagnostics,
            lines_scanned: self.lines_scanned,
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────────

    fn enter_date(&mut self, line_no: usize, year: u32, month: u32, day: u32) {
        // A pending marker survives date changes.
        match validate_date(year, month, day) {
            Some(date) => self.current_date = Some(date),
            None => {
                self.current_date = None;
                self.flag(line_no, LogIssue::InvalidDate { year, month, day });
            }
        }
    }

    fn record_total(&mut self, hours: u32, minutes: u32) {
        let Some(date) = self.current_date else {
            return;
        };
        let total = hours.saturating_mul(60).saturating_add(minutes);
        debug!("{}: 睡眠合計 {}時間{}分 ({}分)", date, hours, minutes, total);
        self.daily_totals.insert(date, total);
    }

    fn record_activity(&mut self, line_no: usize, hour: u32, minute: u32, activity: &str) {
        let Some(date) = self.current_date else {
            return;
        };
        let Some(time) = validate_time(hour, minute) else {
            self.flag(line_no, LogIssue::InvalidTime { hour, minute });
            return;
        };

        if activity.contains(SLEEP_MARKER) {
            if let Some(previous) = self.pending {
                debug!(
                    "line {}: unclosed sleep from {} {} replaced",
                    line_no, previous.date, previous.time
                );
            }
            self.pending = Some(PendingSleep { date, time });
        }

        if activity.contains(WAKE_MARKER) {
            if let Some(begin) = self.pending.take() {
                self.close_session(line_no, begin, date, time, activity);
            }
        }
    }

    fn close_session(
        &mut self,
        line_no: usize,
        begin: PendingSleep,
        wake_date: NaiveDate,
        wake_time: NaiveTime,
        activity: &str,
    ) {
        let minutes = inline_duration(activity).unwrap_or_else(|| {
            elapsed_minutes(begin.date.and_time(begin.time), wake_date.and_time(wake_time))
        });

        if !(0..=MINUTES_PER_DAY).contains(&minutes) {
            self.flag(line_no, LogIssue::UnresolvedDuration { minutes });
            return;
        }
        if minutes == 0 {
            debug!("line {}: zero-length sleep discarded", line_no);
            return;
        }

        self.sessions.push(SleepSession {
            date: begin.date,
            sleep_time: begin.time,
            wake_time,
            duration_minutes: minutes as u32,
        });
    }

    fn flag(&mut self, line_no: usize, issue: LogIssue) {
        let diagnostic = Diagnostic::warning(line_no, issue);
        warn!("{}", diagnostic.message());
        self.diagnostics.push(diagnostic);
    }
}

// ── ParsedLog ─────────────────────────────────────────────────────────────────

/// Everything one parse pass produced.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Sessions sorted by date, ties in log order.
    pub sessions: Vec<SleepSession>,
    pub daily_totals: DailyTotals,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of raw lines seen, blank ones included.
    pub lines_scanned: usize,
}

impl ParsedLog {
    pub fn into_dataset(self) -> Dataset {
        Dataset {
            sessions: self.sessions,
            daily_totals: self.daily_totals,
        }
    }
}

// ── LogParser ─────────────────────────────────────────────────────────────────

/// Stateless entry point for parsing a whole text block.
pub struct LogParser;

impl LogParser {
    /// Parse `text` line by line. Never fails: unusable lines are skipped and
    /// reported through [`ParsedLog::diagnostics`].
    pub fn parse(text: &str) -> ParsedLog {
        text.lines()
            .enumerate()
            .fold(ParseState::default(), |state, (idx, line)| {
                state.step(idx + 1, line)
            })
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
