//! Merging of several pasted log periods into one parseable text.
//!
//! Tabs are joined textually before a single parse pass, so a sleep that
//! starts at the end of one period and ends at the start of the next is
//! still paired up.

use std::sync::OnceLock;

use piyolog_core::models::{Diagnostic, Severity, TabInput, TabReport, TabStatus, YearMonth};
use piyolog_core::time_utils::{month_gap, validate_date};
use piyolog_core::{LogIssue, PiyologError, Result};
use regex::Regex;
use tracing::{debug, warn};

/// Text placed between two non-empty tabs.
pub const TAB_SEPARATOR: &str = "\n\n";

fn log_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^【ぴよログ】[^\n]*\n-+[\r\n]*").expect("regex is valid"))
}

fn month_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"【ぴよログ】([0-9]{4})年([0-9]{1,2})月").expect("regex is valid"))
}

fn first_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([0-9]{4})/([0-9]{1,2})/[0-9]{1,2}").expect("regex is valid"))
}

// ── CombinedLog ───────────────────────────────────────────────────────────────

/// The concatenated text of every non-empty tab plus per-tab bookkeeping.
#[derive(Debug, Clone)]
pub struct CombinedLog {
    /// Header-stripped tab texts joined by [`TAB_SEPARATOR`].
    pub text: String,
    /// One entry per input tab, in input order.
    pub tabs: Vec<TabReport>,
    /// Month covered by each loaded tab, in input order.
    pub months: Vec<Option<YearMonth>>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Remove the export's leading `【ぴよログ】…` line, the dashed separator
/// under it and any blank lines that follow.
///
/// Text without such a header is returned unchanged.
pub fn strip_log_header(text: &str) -> &str {
    match log_header_re().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Month a tab covers: from its `【ぴよログ】YYYY年M月` header if present,
/// otherwise from the first date-like token in the text.
pub fn extract_month_info(text: &str) -> Option<YearMonth> {
    let cap = month_header_re()
        .captures(text)
        .or_else(|| first_date_re().captures(text))?;
    let year: u32 = cap[1].parse().ok()?;
    let month: u32 = cap[2].parse().ok()?;
    // Reuse the date-header bounds so nonsense like 0000/13 is discarded.
    validate_date(year, month, 1).map(YearMonth::of)
}

/// Trim each tab, drop the empty ones, strip headers and join the rest.
///
/// Fails with [`PiyologError::NoInputProvided`] when every tab is empty.
pub fn combine_tabs(tabs: &[TabInput]) -> Result<CombinedLog> {
    let mut text = String::new();
    let mut reports = Vec::with_capacity(tabs.len());
    let mut months = Vec::new();

    for tab in tabs {
        let trimmed = tab.text.trim();
        if trimmed.is_empty() {
            debug!("tab {:?} is empty", tab.name);
            reports.push(TabReport {
                name: tab.name.clone(),
                status: TabStatus::Empty,
            });
            continue;
        }

        months.push(extract_month_info(trimmed));

        if !text.is_empty() {
            text.push_str(TAB_SEPARATOR);
        }
        text.push_str(strip_log_header(trimmed));

        reports.push(TabReport {
            name: tab.name.clone(),
            status: TabStatus::Loaded,
        });
    }

    if reports.iter().all(|r| r.status == TabStatus::Empty) {
        return Err(PiyologError::NoInputProvided);
    }

    Ok(CombinedLog {
        text,
        tabs: reports,
        months,
    })
}

/// Warn about consecutive loaded tabs that skip one or more months.
///
/// Tabs whose month could not be determined are not compared.
pub fn check_month_continuity(months: &[Option<YearMonth>]) -> Vec<Diagnostic> {
    months
        .windows(2)
        .filter_map(|pair| match (pair[0], pair[1]) {
            (Some(from), Some(to)) => Some((from, to)),
            _ => None,
        })
        .filter_map(|(from, to)| {
            let gap = month_gap(from, to);
            (gap > 1).then(|| {
                let diagnostic = Diagnostic {
                    line: 0,
                    severity: Severity::Warning,
                    issue: LogIssue::MonthGap {
                        from,
                        to,
                        missing: gap - 1,
                    },
                };
                warn!("{}", diagnostic.message());
                diagnostic
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
