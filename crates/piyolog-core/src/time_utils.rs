use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::models::YearMonth;

/// Earliest year accepted in a date header.
pub const MIN_YEAR: u32 = 1900;
/// Latest year accepted in a date header.
pub const MAX_YEAR: u32 = 2100;
/// Longest sleep a single session may span.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

// ── Validation ────────────────────────────────────────────────────────────────

/// Turn a `year/month/day` triple from a date header into a [`NaiveDate`].
///
/// The year must lie in `1900..=2100`, the month in `1..=12` and the day in
/// `1..=31`; the triple must then name a real calendar day, so `2023/2/29`
/// is rejected while `2024/2/29` is accepted.
pub fn validate_date(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    NaiveDate::from_ymd_opt(year as i32, month, day)
}

/// Turn an `hour:minute` pair into a [`NaiveTime`] if both are in range.
pub fn validate_time(hour: u32, minute: u32) -> Option<NaiveTime> {
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

// ── Arithmetic ────────────────────────────────────────────────────────────────

/// Minutes from `begin` to `wake`.
///
/// When `wake` is not strictly after `begin` a full day is added, which is
/// how an overnight sleep logged under a single date header resolves.
/// The result can still be negative (wake more than a day before begin) or
/// exceed a day; callers bound-check it.
pub fn elapsed_minutes(begin: NaiveDateTime, wake: NaiveDateTime) -> i64 {
    let wake = if wake <= begin {
        wake + Duration::hours(24)
    } else {
        wake
    };
    (wake - begin).num_minutes()
}

/// `hour + minute / 60` as used on the 0–24 interval axis.
pub fn time_to_decimal(time: NaiveTime) -> f64 {
    f64::from(time.hour()) + f64::from(time.minute()) / 60.0
}

/// Number of months from `from` to `to` (negative if `to` is earlier).
pub fn month_gap(from: YearMonth, to: YearMonth) -> i32 {
    (to.year - from.year) * 12 + (to.month as i32 - from.month as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: &str, h: u32, m: u32) -> NaiveDateTime {
        date.parse::<NaiveDate>()
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_validate_date_leap_years() {
        assert!(validate_date(2024, 2, 29).is_some());
        assert!(validate_date(2023, 2, 29).is_none());
        assert!(validate_date(2024, 2, 30).is_none());
        assert!(validate_date(2000, 2, 29).is_some());
        assert!(validate_date(1900, 2, 29).is_none());
    }

    #[test]
    fn test_validate_date_ranges() {
        assert!(validate_date(1899, 12, 31).is_none());
        assert!(validate_date(2101, 1, 1).is_none());
        assert!(validate_date(2100, 12, 31).is_some());
        assert!(validate_date(2024, 0, 1).is_none());
        assert!(validate_date(2024, 13, 1).is_none());
        assert!(validate_date(2024, 1, 0).is_none());
        assert!(validate_date(2024, 4, 31).is_none());
    }

    #[test]
    fn test_validate_time() {
        assert!(validate_time(0, 0).is_some());
        assert!(validate_time(23, 59).is_some());
        assert!(validate_time(24, 0).is_none());
        assert!(validate_time(12, 60).is_none());
    }

    #[test]
    fn test_elapsed_minutes_same_day() {
        assert_eq!(
            elapsed_minutes(at("2024-07-01", 1, 0), at("2024-07-01", 2, 15)),
            75
        );
    }

    #[test]
    fn test_elapsed_minutes_overnight_same_header() {
        assert_eq!(
            elapsed_minutes(at("2024-07-01", 23, 50), at("2024-07-01", 0, 10)),
            20
        );
    }

    #[test]
    fn test_elapsed_minutes_across_headers() {
        assert_eq!(
            elapsed_minutes(at("2024-07-01", 22, 0), at("2024-07-02", 6, 0)),
            480
        );
    }

    #[test]
    fn test_elapsed_minutes_equal_instants_is_a_full_day() {
        assert_eq!(
            elapsed_minutes(at("2024-07-01", 8, 0), at("2024-07-01", 8, 0)),
            MINUTES_PER_DAY
        );
    }

    #[test]
    fn test_elapsed_minutes_wake_far_before_begin_is_negative() {
        assert!(elapsed_minutes(at("2024-07-05", 8, 0), at("2024-07-01", 9, 0)) < 0);
    }

    #[test]
    fn test_time_to_decimal() {
        let t = NaiveTime::from_hms_opt(6, 30, 0).unwrap();
        assert!((time_to_decimal(t) - 6.5).abs() < 1e-9);
    }

    #[test]
    fn test_month_gap() {
        assert_eq!(month_gap(YearMonth::new(2024, 11), YearMonth::new(2025, 1)), 2);
        assert_eq!(month_gap(YearMonth::new(2024, 3), YearMonth::new(2024, 4)), 1);
        assert_eq!(month_gap(YearMonth::new(2024, 3), YearMonth::new(2024, 1)), -2);
    }
}
