//! Human-readable timestamp formatting for display records.
//!
//! Converts ISO-8601-ish instants into the dashboard's fixed
//! `"03rd March 2024 - 04:15 PM UTC"` shape. Parsing is deliberately
//! forgiving: anything unparseable passes through unchanged, so a bad
//! upstream timestamp can never break presentation.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};

/// Format a raw ISO-8601-ish instant for display.
///
/// - `Z` suffixes are normalized to an explicit `+00:00` offset.
/// - Bare `YYYY-MM-DDTHH:MM:SS[.ffffff]` forms are assumed UTC.
/// - Instants carrying a non-UTC offset are converted to UTC first.
/// - Unparseable input comes back unchanged; empty input becomes
///   `"Just now"`.
pub fn format(raw: &str) -> String {
  if raw.is_empty() {
    return "Just now".to_string();
  }

  match parse_instant(raw) {
    Some(utc) => {
      let suffix = ordinal_suffix(utc.day());
      utc
        .format(&format!("%d{suffix} %B %Y - %I:%M %p UTC"))
        .to_string()
    }
    None => raw.to_string(),
  }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
  let cleaned = raw.replace('Z', "+00:00");

  if let Ok(dt) = DateTime::parse_from_rfc3339(&cleaned) {
    return Some(dt.with_timezone(&Utc));
  }

  // Offset-less producer form; treat as UTC.
  NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .map(|naive| naive.and_utc())
}

/// English ordinal suffix for a day-of-month.
///
/// Day 0 never comes out of a parsed date; the arm exists so nothing can
/// fall through the `% 10` table.
fn ordinal_suffix(day: u32) -> &'static str {
  match day {
    0 | 4..=20 | 24..=30 => "th",
    d => match d % 10 {
      1 => "st",
      2 => "nd",
      3 => "rd",
      _ => "th",
    },
  }
}
