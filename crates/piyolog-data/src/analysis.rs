//! Summary statistics and the top-level analysis pipeline.
//!
//! Combines the tab texts, parses them in one pass, and returns an
//! [`AnalysisResult`] with everything the renderer needs.

use chrono::{NaiveDate, Utc};
use piyolog_core::formatting::format_date_range;
use piyolog_core::models::{Dataset, Diagnostic, TabInput, TabReport};
use piyolog_core::{PiyologError, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::aggregator::{check_month_continuity, combine_tabs};
use crate::parser::LogParser;
use crate::projection::{
    daily_bars, month_boundaries, sleep_intervals, AlphaScale, DailyBar, IntervalProjection,
    MonthBoundary,
};

/// Placeholder shown for the date range of an empty dataset.
pub const EMPTY_RANGE: &str = "-";

// ── Statistics ────────────────────────────────────────────────────────────────

/// Mean session length in minutes; 0 when there are no sessions.
pub fn average_session_minutes(dataset: &Dataset) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let total: u64 = dataset
        .sessions
        .iter()
        .map(|s| u64::from(s.duration_minutes))
        .sum();
    total as f64 / dataset.sessions.len() as f64
}

/// Mean of the per-date "睡眠合計" values; 0 when there are none.
pub fn average_daily_total_minutes(dataset: &Dataset) -> f64 {
    if dataset.daily_totals.is_empty() {
        return 0.0;
    }
    let total: u64 = dataset.daily_totals.values().map(|m| u64::from(*m)).sum();
    total as f64 / dataset.daily_totals.len() as f64
}

/// Earliest and latest session date.
pub fn date_range(dataset: &Dataset) -> Option<(NaiveDate, NaiveDate)> {
    let min = dataset.sessions.iter().map(|s| s.date).min()?;
    let max = dataset.sessions.iter().map(|s| s.date).max()?;
    Some((min, max))
}

/// [`date_range`] formatted for display, or `"-"` without sessions.
pub fn date_range_label(dataset: &Dataset) -> String {
    match date_range(dataset) {
        Some((min, max)) => format_date_range(min, max),
        None => EMPTY_RANGE.to_string(),
    }
}

/// The headline numbers of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepSummary {
    pub session_count: usize,
    /// Number of dates with a "睡眠合計" line.
    pub day_count: usize,
    pub average_session_minutes: f64,
    pub average_daily_total_minutes: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub date_range: String,
}

impl SleepSummary {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let range = date_range(dataset);
        Self {
            session_count: dataset.sessions.len(),
            day_count: dataset.daily_totals.len(),
            average_session_minutes: average_session_minutes(dataset),
            average_daily_total_minutes: average_daily_total_minutes(dataset),
            first_date: range.map(|(min, _)| min),
            last_date: range.map(|(_, max)| max),
            date_range: date_range_label(dataset),
        }
    }
}

// ── Pipeline types ────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Tabs that contributed text.
    pub tabs_loaded: usize,
    /// Lines in the combined text, blank ones included.
    pub lines_scanned: usize,
    pub sessions_found: usize,
    pub days_with_totals: usize,
    pub diagnostics_count: usize,
    /// Wall-clock seconds spent parsing the combined text.
    pub parse_time_seconds: f64,
}

/// The complete output of [`analyze_tabs`].
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub dataset: Dataset,
    pub summary: SleepSummary,
    pub daily_bars: Vec<DailyBar>,
    pub month_boundaries: Vec<MonthBoundary>,
    pub intervals: IntervalProjection,
    /// Recovered issues, whole-input findings first, then in line order.
    pub diagnostics: Vec<Diagnostic>,
    pub tabs: Vec<TabReport>,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full analysis pipeline.
///
/// 1. Merge the tab texts ([`PiyologError::NoInputProvided`] if all are empty).
/// 2. Check that consecutive tabs cover consecutive months.
/// 3. Parse the merged text in a single pass.
/// 4. Fail with [`PiyologError::NoSleepDataFound`] if no session was closed.
/// 5. Derive the summary and chart projections.
pub fn analyze_tabs(tabs: &[TabInput], scale: &AlphaScale) -> Result<AnalysisResult> {
    // ── Step 1: Merge ─────────────────────────────────────────────────────────
    let combined = combine_tabs(tabs)?;
    let tabs_loaded = combined.months.len();

    // ── Step 2: Month continuity ──────────────────────────────────────────────
    let mut diagnostics = check_month_continuity(&combined.months);

    // ── Step 3: Parse ─────────────────────────────────────────────────────────
    let parse_start = std::time::Instant::now();
    let parsed = LogParser::parse(&combined.text);
    let parse_time = parse_start.elapsed().as_secs_f64();

    debug!(
        "Parsed {} lines into {} sessions and {} daily totals",
        parsed.lines_scanned,
        parsed.sessions.len(),
        parsed.daily_totals.len()
    );

    // ── Step 4: Require data ──────────────────────────────────────────────────
    if parsed.sessions.is_empty() {
        return Err(PiyologError::NoSleepDataFound {
            lines_scanned: parsed.lines_scanned,
        });
    }

    let lines_scanned = parsed.lines_scanned;
    diagnostics.extend(parsed.diagnostics.iter().cloned());
    let dataset = parsed.into_dataset();

    // ── Step 5: Derive ────────────────────────────────────────────────────────
    let summary = SleepSummary::from_dataset(&dataset);
    let bars = daily_bars(&dataset);
    let boundaries = month_boundaries(&dataset);
    let intervals = sleep_intervals(&dataset, scale);

    info!(
        "Analysed {} sessions over {} ({} diagnostics)",
        summary.session_count,
        summary.date_range,
        diagnostics.len()
    );

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        tabs_loaded,
        lines_scanned,
        sessions_found: dataset.sessions.len(),
        days_with_totals: dataset.daily_totals.len(),
        diagnostics_count: diagnostics.len(),
        parse_time_seconds: parse_time,
    };

    Ok(AnalysisResult {
        dataset,
        summary,
        daily_bars: bars,
        month_boundaries: boundaries,
        intervals,
        diagnostics,
        tabs: combined.tabs,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
