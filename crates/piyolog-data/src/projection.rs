//! Chart-ready projections of a [`Dataset`].
//!
//! Nothing here draws anything: the renderer receives plain rows and
//! segments with day indices on a 1-based "day N" axis and hours on a 0–24
//! axis.

use chrono::NaiveDate;
use piyolog_core::formatting::round_to;
use piyolog_core::models::{Dataset, YearMonth};
use piyolog_core::settings::{DEFAULT_MAX_ALPHA, DEFAULT_MIN_ALPHA};
use piyolog_core::time_utils::time_to_decimal;
use serde::{Deserialize, Serialize};

const HOURS_PER_DAY: f64 = 24.0;

// ── Daily bars ────────────────────────────────────────────────────────────────

/// One bar of the per-day total chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBar {
    /// Position in the sorted list of dated totals, starting at 1.
    pub day_index: usize,
    pub date: NaiveDate,
    /// Total sleep in hours, rounded to one decimal.
    pub hours: f64,
}

/// One bar per date with a "睡眠合計" line, in date order.
pub fn daily_bars(dataset: &Dataset) -> Vec<DailyBar> {
    dataset
        .daily_totals
        .iter()
        .enumerate()
        .map(|(idx, (date, minutes))| DailyBar {
            day_index: idx + 1,
            date: *date,
            hours: round_to(f64::from(*minutes) / 60.0, 1),
        })
        .collect()
}

/// Where a new month starts on the bar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBoundary {
    /// Day index of the first bar belonging to `month`.
    pub day_index: usize,
    pub month: YearMonth,
    pub date: NaiveDate,
}

/// First bar of every month after the first one.
pub fn month_boundaries(dataset: &Dataset) -> Vec<MonthBoundary> {
    let mut boundaries = Vec::new();
    let mut previous: Option<YearMonth> = None;

    for (idx, date) in dataset.daily_totals.keys().enumerate() {
        let month = YearMonth::of(*date);
        if previous.is_some_and(|p| p != month) {
            boundaries.push(MonthBoundary {
                day_index: idx + 1,
                month,
                date: *date,
            });
        }
        previous = Some(month);
    }
    boundaries
}

// ── Colour intensity ──────────────────────────────────────────────────────────

/// Linear map from session length to a colour alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaScale {
    /// Alpha of the shortest session.
    pub min: f64,
    /// Alpha of the longest session.
    pub max: f64,
}

impl Default for AlphaScale {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ALPHA,
            max: DEFAULT_MAX_ALPHA,
        }
    }
}

impl AlphaScale {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Alpha for `duration` given the shortest and longest durations in the
    /// dataset. A degenerate range (all sessions equally long) maps to the
    /// midpoint.
    pub fn intensity(&self, duration: f64, shortest: f64, longest: f64) -> f64 {
        let range = longest - shortest;
        if range.is_nan() || range <= 0.0 {
            return self.midpoint();
        }
        let normalized = ((duration - shortest) / range).clamp(0.0, 1.0);
        self.min + normalized * (self.max - self.min)
    }
}

// ── Sleep intervals ───────────────────────────────────────────────────────────

/// A horizontal bar on the time-of-day chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalSegment {
    /// Row the segment is drawn on, starting at 1.
    pub day_index: usize,
    /// Position of the owning session among its date's sessions, starting at 1.
    pub session_index: usize,
    /// Segment start on the 0–24 axis.
    pub start_hour: f64,
    /// Segment end on the 0–24 axis.
    pub end_hour: f64,
    /// Owning session's start, decimal hours.
    pub session_start: f64,
    /// Owning session's end, decimal hours; above 24 when it crosses midnight.
    pub session_end: f64,
    pub duration_hours: f64,
    pub alpha: f64,
    /// `true` for the after-midnight half of a split session.
    pub continuation: bool,
}

/// All segments plus the dates behind each day index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntervalProjection {
    /// `days[i]` is the date drawn on day index `i + 1`.
    pub days: Vec<NaiveDate>,
    pub segments: Vec<IntervalSegment>,
}

struct PlottedSpan {
    date: NaiveDate,
    start: f64,
    end: f64,
}

impl PlottedSpan {
    fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Project every session onto the day-by-hour grid.
///
/// Day indices follow the distinct session dates, independently of
/// [`daily_bars`]. A session ending after midnight is split at 24:00; the
/// remainder goes on the next row when there is one.
pub fn sleep_intervals(dataset: &Dataset, scale: &AlphaScale) -> IntervalProjection {
    let days = dataset.session_dates();

    let spans: Vec<PlottedSpan> = dataset
        .sessions
        .iter()
        .map(|s| {
            let start = time_to_decimal(s.sleep_time);
            let wake = time_to_decimal(s.wake_time);
            let end = if wake <= start {
                wake + HOURS_PER_DAY
            } else {
                wake
            };
            PlottedSpan {
                date: s.date,
                start,
                end,
            }
        })
        .collect();

    let shortest = spans
        .iter()
        .map(PlottedSpan::duration)
        .fold(f64::INFINITY, f64::min);
    let longest = spans
        .iter()
        .map(PlottedSpan::duration)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut segments = Vec::new();
    for (idx, day) in days.iter().enumerate() {
        let day_index = idx + 1;

        for (n, span) in spans.iter().filter(|sp| sp.date == *day).enumerate() {
            let alpha = scale.intensity(span.duration(), shortest, longest);
            let segment = |row: usize, from: f64, to: f64, continuation: bool| IntervalSegment {
                day_index: row,
                session_index: n + 1,
                start_hour: from,
                end_hour: to,
                session_start: span.start,
                session_end: span.end,
                duration_hours: span.duration(),
                alpha,
                continuation,
            };

            if span.end <= HOURS_PER_DAY {
                segments.push(segment(day_index, span.start, span.end, false));
            } else {
                segments.push(segment(day_index, span.start, HOURS_PER_DAY, false));
                if day_index < days.len() {
                    segments.push(segment(
                        day_index + 1,
                        0.0,
                        span.end - HOURS_PER_DAY,
                        true,
                    ));
                }
            }
        }
    }

    IntervalProjection { days, segments }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use piyolog_core::models::{DailyTotals, SleepSession};

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn session(d: &str, sleep: &str, wake: &str, minutes: u32) -> SleepSession {
        SleepSession {
            date: date(d),
            sleep_time: NaiveTime::parse_from_str(sleep, "%H:%M").unwrap(),
            wake_time: NaiveTime::parse_from_str(wake, "%H:%M").unwrap(),
            duration_minutes: minutes,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    // ── daily_bars ────────────────────────────────────────────────────────────

    #[test]
    fn test_daily_bars_sorted_and_indexed_from_one() {
        let mut totals = DailyTotals::new();
        totals.insert(date("2024-07-02"), 725);
        totals.insert(date("2024-07-01"), 600);
        let dataset = Dataset {
            sessions: vec![],
            daily_totals: totals,
        };

        let bars = daily_bars(&dataset);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].day_index, 1);
        assert_eq!(bars[0].date, date("2024-07-01"));
        assert!(approx(bars[0].hours, 10.0));
        assert_eq!(bars[1].day_index, 2);
        assert!(approx(bars[1].hours, 12.1));
    }

    #[test]
    fn test_daily_bars_empty() {
        assert!(daily_bars(&Dataset::default()).is_empty());
    }

    // ── month_boundaries ──────────────────────────────────────────────────────

    #[test]
    fn test_month_boundaries_mark_first_day_of_later_months() {
        let mut totals = DailyTotals::new();
        for d in ["2024-07-30", "2024-07-31", "2024-08-01", "2024-08-02", "2024-09-01"] {
            totals.insert(date(d), 600);
        }
        let dataset = Dataset {
            sessions: vec![],
            daily_totals: totals,
        };

        let boundaries = month_boundaries(&dataset);
        assert_eq!(boundaries.len(), 2);
        assert_eq!(boundaries[0].day_index, 3);
        assert_eq!(boundaries[0].month, YearMonth::new(2024, 8));
        assert_eq!(boundaries[1].day_index, 5);
        assert_eq!(boundaries[1].date, date("2024-09-01"));
    }

    #[test]
    fn test_month_boundaries_single_month_is_empty() {
        let mut totals = DailyTotals::new();
        totals.insert(date("2024-07-01"), 600);
        totals.insert(date("2024-07-02"), 600);
        let dataset = Dataset {
            sessions: vec![],
            daily_totals: totals,
        };
        assert!(month_boundaries(&dataset).is_empty());
    }

    // ── AlphaScale ────────────────────────────────────────────────────────────

    #[test]
    fn test_intensity_linear_between_bounds() {
        let scale = AlphaScale::default();
        assert!(approx(scale.intensity(1.0, 1.0, 5.0), 0.3));
        assert!(approx(scale.intensity(5.0, 1.0, 5.0), 0.9));
        assert!(approx(scale.intensity(3.0, 1.0, 5.0), 0.6));
    }

    #[test]
    fn test_intensity_degenerate_range_uses_midpoint() {
        let scale = AlphaScale::new(0.2, 0.8);
        assert!(approx(scale.intensity(2.0, 2.0, 2.0), 0.5));
    }

    // ── sleep_intervals ───────────────────────────────────────────────────────

    #[test]
    fn test_intervals_plain_session() {
        let dataset = Dataset {
            sessions: vec![session("2024-07-01", "13:00", "14:30", 90)],
            daily_totals: DailyTotals::new(),
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());

        assert_eq!(projection.days, vec![date("2024-07-01")]);
        assert_eq!(projection.segments.len(), 1);
        let seg = &projection.segments[0];
        assert_eq!(seg.day_index, 1);
        assert_eq!(seg.session_index, 1);
        assert!(approx(seg.start_hour, 13.0));
        assert!(approx(seg.end_hour, 14.5));
        assert!(approx(seg.alpha, 0.6));
        assert!(!seg.continuation);
    }

    #[test]
    fn test_intervals_split_at_midnight_onto_next_row() {
        let dataset = Dataset {
            sessions: vec![
                session("2024-07-01", "22:00", "06:00", 480),
                session("2024-07-02", "13:00", "14:00", 60),
            ],
            daily_totals: DailyTotals::new(),
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());
        let segs = &projection.segments;

        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].day_index, 1);
        assert!(approx(segs[0].start_hour, 22.0));
        assert!(approx(segs[0].end_hour, 24.0));
        assert!(approx(segs[0].session_end, 30.0));

        assert_eq!(segs[1].day_index, 2);
        assert!(segs[1].continuation);
        assert!(approx(segs[1].start_hour, 0.0));
        assert!(approx(segs[1].end_hour, 6.0));
        assert!(approx(segs[1].alpha, 0.9));

        assert_eq!(segs[2].day_index, 2);
        assert!(approx(segs[2].alpha, 0.3));
    }

    #[test]
    fn test_intervals_drop_continuation_after_last_row() {
        let dataset = Dataset {
            sessions: vec![session("2024-07-01", "23:50", "00:10", 20)],
            daily_totals: DailyTotals::new(),
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());
        assert_eq!(projection.segments.len(), 1);
        assert!(approx(projection.segments[0].end_hour, 24.0));
    }

    #[test]
    fn test_intervals_wake_at_midnight_is_not_split() {
        let dataset = Dataset {
            sessions: vec![
                session("2024-07-01", "21:00", "00:00", 180),
                session("2024-07-02", "01:00", "02:00", 60),
            ],
            daily_totals: DailyTotals::new(),
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());
        assert_eq!(projection.segments.len(), 2);
        assert!(approx(projection.segments[0].end_hour, 24.0));
        assert!(projection.segments.iter().all(|s| !s.continuation));
    }

    #[test]
    fn test_intervals_index_independent_of_daily_totals() {
        let mut totals = DailyTotals::new();
        totals.insert(date("2024-06-30"), 600);
        let dataset = Dataset {
            sessions: vec![session("2024-07-05", "01:00", "02:00", 60)],
            daily_totals: totals,
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());
        assert_eq!(projection.segments[0].day_index, 1);
        assert_eq!(daily_bars(&dataset)[0].day_index, 1);
    }

    #[test]
    fn test_intervals_session_index_counts_within_day() {
        let dataset = Dataset {
            sessions: vec![
                session("2024-07-01", "01:00", "03:00", 120),
                session("2024-07-01", "09:00", "10:00", 60),
            ],
            daily_totals: DailyTotals::new(),
        };
        let projection = sleep_intervals(&dataset, &AlphaScale::default());
        let indices: Vec<usize> = projection.segments.iter().map(|s| s.session_index).collect();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_intervals_empty_dataset() {
        let projection = sleep_intervals(&Dataset::default(), &AlphaScale::default());
        assert!(projection.days.is_empty());
        assert!(projection.segments.is_empty());
    }
}
