// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Parse the --filter expression into a Reporting API dimension filter clause
// role: parsing/filter
// inputs: Raw filter string, e.g. "ga:browser EXACT Firefox AND ga:dimension1 BEGINS_WITH 01"
// outputs: DimensionFilterClause serializable as a `dimensionFilterClauses` entry
// invariants: A clause joins all filters with one boolean operator (AND takes precedence over OR); operators are a closed set
// errors: Any unparseable part rejects the whole expression as a validation error
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::{DownloadError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
  Regexp,
  BeginsWith,
  EndsWith,
  Partial,
  Exact,
}

impl FilterOperator {
  pub const ALL: [FilterOperator; 5] = [
    FilterOperator::Regexp,
    FilterOperator::BeginsWith,
    FilterOperator::EndsWith,
    FilterOperator::Partial,
    FilterOperator::Exact,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      FilterOperator::Regexp => "REGEXP",
      FilterOperator::BeginsWith => "BEGINS_WITH",
      FilterOperator::EndsWith => "ENDS_WITH",
      FilterOperator::Partial => "PARTIAL",
      FilterOperator::Exact => "EXACT",
    }
  }

  fn from_keyword(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|op| op.as_str() == s)
  }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClauseOperator {
  And,
  Or,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionFilter {
  pub dimension_name: String,
  pub operator: FilterOperator,
  pub expressions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DimensionFilterClause {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub operator: Option<ClauseOperator>,
  pub filters: Vec<DimensionFilter>,
}

static RE_FILTER: Lazy<Regex> = Lazy::new(|| {
  let ops: Vec<&str> = FilterOperator::ALL.iter().map(|op| op.as_str()).collect();
  Regex::new(&format!(r"^ *(ga:\w+) +({}) (.*)$", ops.join("|"))).unwrap()
});

pub fn parse_filter(expr: &str) -> Result<DimensionFilterClause> {
  let (operator, parts): (Option<ClauseOperator>, Vec<&str>) = if expr.contains(" AND ") {
    (Some(ClauseOperator::And), expr.split(" AND ").collect())
  } else if expr.contains(" OR ") {
    (Some(ClauseOperator::Or), expr.split(" OR ").collect())
  } else {
    (None, vec![expr])
  };

  let mut filters = Vec::with_capacity(parts.len());

  for part in parts {
    let caps = RE_FILTER
      .captures(part)
      .ok_or_else(|| DownloadError::validation(format!("Invalid filter arguments: {expr}")))?;
    let operator = FilterOperator::from_keyword(&caps[2])
      .ok_or_else(|| DownloadError::validation(format!("Invalid filter arguments: {expr}")))?;

    filters.push(DimensionFilter {
      dimension_name: caps[1].to_string(),
      operator,
      expressions: vec![caps[3].trim().to_string()],
    });
  }

  Ok(DimensionFilterClause { operator, filters })
}
