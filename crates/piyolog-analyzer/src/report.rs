//! Plain-text and JSON rendering of an [`AnalysisResult`].

use std::fmt::{self, Write as _};

use piyolog_core::formatting::{format_date_slash, format_decimal_hour, format_duration_ja, format_time};
use piyolog_core::models::TabStatus;
use piyolog_data::analysis::AnalysisResult;
use piyolog_data::projection::IntervalSegment;

/// Pretty-printed JSON of the whole result.
pub fn render_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Human-readable report: summary, per-day totals, sleep intervals and any
/// diagnostics.
pub fn render_text(result: &AnalysisResult) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_summary(&mut out, result)?;
    write_daily_bars(&mut out, result)?;
    write_intervals(&mut out, result)?;
    write_empty_tabs(&mut out, result)?;
    write_diagnostics(&mut out, result)?;
    Ok(out)
}

fn write_summary(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    let summary = &result.summary;
    writeln!(out, "ぴよログ 睡眠分析")?;
    writeln!(out, "  期間:              {}", summary.date_range)?;
    writeln!(
        out,
        "  平均睡眠時間:      {}",
        format_duration_ja(summary.average_session_minutes)
    )?;
    writeln!(
        out,
        "  1日の平均睡眠時間: {}",
        format_duration_ja(summary.average_daily_total_minutes)
    )?;
    writeln!(
        out,
        "  睡眠回数: {}  記録日数: {}",
        summary.session_count, summary.day_count
    )
}

fn write_daily_bars(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    if result.daily_bars.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "日別睡眠時間")?;
    for bar in &result.daily_bars {
        if let Some(boundary) = result
            .month_boundaries
            .iter()
            .find(|b| b.day_index == bar.day_index)
        {
            writeln!(out, "  ── {} ──", boundary.month)?;
        }
        writeln!(
            out,
            "  {:>3}日目  {}  {:>4.1}時間",
            bar.day_index,
            format_date_slash(bar.date),
            bar.hours
        )?;
    }
    Ok(())
}

fn write_intervals(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "日別睡眠時間帯")?;
    for segment in &result.intervals.segments {
        writeln!(out, "  {}", segment_line(segment))?;
    }
    Ok(())
}

fn write_empty_tabs(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    let mut empty = result
        .tabs
        .iter()
        .filter(|t| t.status == TabStatus::Empty)
        .peekable();
    if empty.peek().is_none() {
        return Ok(());
    }
    writeln!(out)?;
    for tab in empty {
        writeln!(out, "  {}: 空のため読み込みませんでした", tab.name)?;
    }
    Ok(())
}

fn write_diagnostics(out: &mut String, result: &AnalysisResult) -> fmt::Result {
    if result.diagnostics.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Diagnostics ({}):", result.diagnostics.len())?;
    for diagnostic in &result.diagnostics {
        writeln!(out, "  [{}] {}", diagnostic.severity, diagnostic.message())?;
    }
    Ok(())
}

/// One interval row, e.g. `  2日目  00:00-06:00  睡眠1続き 22:00-06:00 (8h) α0.90`.
fn segment_line(segment: &IntervalSegment) -> String {
    let label = if segment.continuation {
        format!("睡眠{}続き", segment.session_index)
    } else {
        format!("睡眠{}", segment.session_index)
    };
    format!(
        "{:>3}日目  {}-{}  {} {}-{} ({}) α{:.2}",
        segment.day_index,
        axis_hour(segment.start_hour),
        axis_hour(segment.end_hour),
        label,
        format_decimal_hour(segment.session_start),
        format_decimal_hour(segment.session_end),
        format_time(segment.duration_hours * 60.0),
        segment.alpha
    )
}

/// Position on the 0–24 axis; the right edge stays `24:00`.
fn axis_hour(hour: f64) -> String {
    if hour >= 24.0 {
        "24:00".to_string()
    } else {
        format_decimal_hour(hour)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
