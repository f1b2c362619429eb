//! Travel date ranges
//!
//! Front ends send ranges in loose shapes ("2025. 12. 09 ~ 2025. 12. 10",
//! "2025-12-09~2025-12-10", "2025-12-09"). The expanded day list is the
//! authoritative date source when cleaning generated itineraries.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::ReconcileError;

/// Maximum trip length the planner will lay out
pub const DEFAULT_MAX_DAYS: usize = 10;

const ISO_FORMAT: &str = "%Y-%m-%d";

/// "2025. 12. 09" -> "2025-12-09"
pub fn normalize_date_str(s: &str) -> String {
    let compact: String = s.trim().replace('.', "-").chars().filter(|c| !c.is_whitespace()).collect();

    let mut out = String::with_capacity(compact.len());
    for c in compact.chars() {
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_end_matches('-').to_string()
}

/// Split a range on `~`; a single date yields an empty end
pub fn parse_date_range(s: &str) -> (String, String) {
    let normalized = normalize_date_str(s);
    match normalized.split_once('~') {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (normalized, String::new()),
    }
}

/// Parse one ISO date
pub fn parse_iso_date(s: &str) -> Result<NaiveDate, ReconcileError> {
    NaiveDate::parse_from_str(s, ISO_FORMAT).map_err(|_| ReconcileError::InvalidDate(s.to_string()))
}

/// Consecutive ISO dates from start to end inclusive, capped at `max_days`.
///
/// Empty when `start` is missing or invalid; just `[start]` when `end` is
/// missing, invalid, or earlier than `start`.
pub fn date_list(start: &str, end: &str, max_days: usize) -> Vec<String> {
    let Ok(first) = parse_iso_date(start) else {
        debug!(%start, "date_list: no usable start date");
        return Vec::new();
    };
    let Ok(last) = parse_iso_date(end) else {
        return vec![start.to_string()];
    };
    if last < first {
        return vec![start.to_string()];
    }

    let mut days = Vec::new();
    let mut current = first;
    while current <= last && days.len() < max_days {
        days.push(current.format(ISO_FORMAT).to_string());
        current += Duration::days(1);
    }
    days
}

/// Expected trip dates for a loose range string
pub fn expected_dates(range: &str, max_days: usize) -> Vec<String> {
    let (start, end) = parse_date_range(range);
    date_list(&start, &end, max_days)
}
