use chrono::NaiveDate;

/// Separator placed between the first and last date of a range.
pub const RANGE_SEPARATOR: &str = " ～ ";

/// Format a duration in minutes the way the summary cards show it.
///
/// # Examples
///
/// ```
/// use piyolog_core::formatting::format_duration_ja;
///
/// assert_eq!(format_duration_ja(375.0), "6時間15分");
/// assert_eq!(format_duration_ja(45.0),  "0時間45分");
/// assert_eq!(format_duration_ja(0.0),   "0時間0分");
/// ```
pub fn format_duration_ja(minutes: f64) -> String {
    let total = minutes.max(0.0).round() as u64;
    format!("{}時間{}分", total / 60, total % 60)
}

/// Format a duration in minutes as a compact human-readable string.
///
/// * `< 60` minutes → `"45m"`
/// * `≥ 60` minutes, no remainder → `"3h"`
/// * `≥ 60` minutes, with remainder → `"3h 45m"`
///
/// # Examples
///
/// ```
/// use piyolog_core::formatting::format_time;
///
/// assert_eq!(format_time(45.0),  "45m");
/// assert_eq!(format_time(60.0),  "1h");
/// assert_eq!(format_time(225.0), "3h 45m");
/// ```
pub fn format_time(minutes: f64) -> String {
    let total_mins = minutes.round() as i64;
    if total_mins < 60 {
        format!("{}m", total_mins)
    } else {
        let hours = total_mins / 60;
        let mins = total_mins % 60;
        if mins == 0 {
            format!("{}h", hours)
        } else {
            format!("{}h {}m", hours, mins)
        }
    }
}

/// Format a decimal hour from the interval axis as `HH:MM`.
///
/// Values past midnight (`≥ 24`) wrap back into the day, so the end of an
/// overnight session reads as its wall-clock wake time.
pub fn format_decimal_hour(decimal: f64) -> String {
    let total = (decimal * 60.0).round() as i64;
    let wrapped = total.rem_euclid(24 * 60);
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// `YYYY/MM/DD` with zero padding.
pub fn format_date_slash(date: NaiveDate) -> String {
    date.format("%Y/%m/%d").to_string()
}

/// A single date when `min == max`, otherwise `"min ～ max"`.
pub fn format_date_range(min: NaiveDate, max: NaiveDate) -> String {
    if min == max {
        format_date_slash(min)
    } else {
        format!(
            "{}{}{}",
            format_date_slash(min),
            RANGE_SEPARATOR,
            format_date_slash(max)
        )
    }
}

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// ── Tests ──────────────────────────────────────────────────────────────────────
