use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{DownloadError, Result};

// Date expressions accepted by the Reporting API; relative forms are sent verbatim.

static RE_ABSOLUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").unwrap());
static RE_RELATIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(today|yesterday|([0-9]+)daysAgo)$").unwrap());

/// Inclusive date range as sent in `dateRanges`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
  pub start_date: String,
  pub end_date: String,
}

pub fn is_valid_date(expr: &str) -> bool {
  if RE_ABSOLUTE.is_match(expr) {
    return NaiveDate::parse_from_str(expr, "%Y-%m-%d").is_ok();
  }
  RE_RELATIVE.is_match(expr)
}

/// Resolve a date expression against a fixed `today`.
pub fn resolve_date(expr: &str, today: NaiveDate) -> Option<NaiveDate> {
  if RE_ABSOLUTE.is_match(expr) {
    return NaiveDate::parse_from_str(expr, "%Y-%m-%d").ok();
  }
  let caps = RE_RELATIVE.captures(expr)?;
  match &caps[1] {
    "today" => Some(today),
    "yesterday" => today.checked_sub_signed(Duration::days(1)),
    _ => {
      let days: i64 = caps.get(2)?.as_str().parse().ok()?;
      today.checked_sub_signed(Duration::try_days(days)?)
    }
  }
}

impl DateRange {
  /// Validate start/end expressions; `end` defaults to `start` (a single day).
  pub fn parse(start: &str, end: Option<&str>, today: NaiveDate) -> Result<Self> {
    let end = end.unwrap_or(start);

    if !is_valid_date(start) {
      return Err(DownloadError::validation(format!("invalid start date format: \"{start}\"")));
    }
    if !is_valid_date(end) {
      return Err(DownloadError::validation(format!("invalid end date format: \"{end}\"")));
    }

    if let (Some(s), Some(e)) = (resolve_date(start, today), resolve_date(end, today)) {
      if e < s {
        return Err(DownloadError::validation(format!(
          "end date \"{end}\" ({e}) is before start date \"{start}\" ({s})"
        )));
      }
    }

    Ok(Self {
      start_date: start.to_string(),
      end_date: end.to_string(),
    })
  }
}
