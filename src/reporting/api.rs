// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reporting API client seam: one page request per call (HTTP batchGet or JSON fixture), plus access token discovery
// role: reporting/api
// inputs: ReportQuery (dimensions, date range, optional filter), optional page token; env GA_ACCESS_TOKEN; optional `gcloud` CLI
// outputs: Page (header columns, raw data rows, next page token)
// side_effects: Network calls to the Reporting API endpoint; spawns `gcloud` during token discovery; reads the fixture file in test mode
// invariants:
// - Token discovery prefers common:access_token, then GA_ACCESS_TOKEN, then `gcloud auth application-default print-access-token`
// - GA_DOWNLOAD_TEST_REPORTS switches to the fixture client and needs no token
// - Responses decode to an empty page rather than panicking on missing fields
// errors: HTTP 401/403 map to Authentication; every other failure maps to Transport; both are fatal to the run
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;
use std::path::Path;

use crate::config::Settings;
use crate::dates::DateRange;
use crate::error::{DownloadError, Result};
use crate::ext::serde_json::JsonFetch;
use crate::filter::DimensionFilterClause;
use crate::model::{DimensionSet, Page};

pub const TEST_REPORTS_ENV: &str = "GA_DOWNLOAD_TEST_REPORTS";
pub const ACCESS_TOKEN_ENV: &str = "GA_ACCESS_TOKEN";

/// One logical report: a dimension set over a date range, optionally filtered.
#[derive(Debug, Clone, Copy)]
pub struct ReportQuery<'a> {
  pub dimensions: &'a DimensionSet,
  pub date_range: &'a DateRange,
  pub filter: Option<&'a DimensionFilterClause>,
}

// --- Trait seam for the reporting service ---
pub trait ReportingApi {
  fn request_page(&self, query: &ReportQuery<'_>, page_token: Option<&str>) -> Result<Page>;
}

/// Build a Reporting API v4 `batchGet` request body for one page.
pub fn build_request_body(
  view_id: &str,
  page_size: u32,
  metric: &str,
  query: &ReportQuery<'_>,
  page_token: Option<&str>,
) -> serde_json::Value {
  let dimensions: Vec<serde_json::Value> = query
    .dimensions
    .names()
    .iter()
    .map(|name| serde_json::json!({ "name": name }))
    .collect();

  let mut request = serde_json::json!({
    "viewId": view_id,
    "pageSize": page_size,
    "metrics": [{ "expression": metric }],
    "dimensions": dimensions,
    "dateRanges": [query.date_range],
  });

  if let Some(clause) = query.filter {
    request["dimensionFilterClauses"] = serde_json::json!([clause]);
  }
  if let Some(token) = page_token {
    request["pageToken"] = serde_json::Value::String(token.to_string());
  }

  serde_json::json!({ "reportRequests": [request] })
}

/// Decode a `batchGet` response body into a page. Rows are returned as sent.
pub fn decode_response(body: &serde_json::Value) -> Page {
  let mut page = Page::default();

  for report in body.fetch("reports").items() {
    if page.header.is_empty() {
      page.header = report.fetch("columnHeader.dimensions").strings();
    }
    for row in report.fetch("data.rows").items() {
      page.rows.push(row.fetch("dimensions").strings());
    }
    page.next_page_token = report.fetch("nextPageToken").to::<String>();
  }

  page
}

struct HttpReportingApi {
  agent: ureq::Agent,
  endpoint: String,
  token: String,
  view_id: String,
  page_size: u32,
  metric: String,
}

impl HttpReportingApi {
  fn new(settings: &Settings, token: String) -> Self {
    Self {
      agent: ureq::Agent::config_builder().build().into(),
      endpoint: settings.endpoint.clone(),
      token,
      view_id: settings.view_id.clone(),
      page_size: settings.page_size,
      metric: settings.metric.clone(),
    }
  }
}

impl ReportingApi for HttpReportingApi {
  fn request_page(&self, query: &ReportQuery<'_>, page_token: Option<&str>) -> Result<Page> {
    let body = build_request_body(&self.view_id, self.page_size, &self.metric, query, page_token);
    tracing::debug!(
      body = %serde_json::to_string_pretty(&body).unwrap_or_default(),
      "batchGet request"
    );

    let resp = self
      .agent
      .post(&self.endpoint)
      .header("Authorization", &format!("Bearer {}", self.token))
      .header("User-Agent", "ga-report-download")
      .send_json(&body);

    match resp {
      Ok(mut r) => r
        .body_mut()
        .read_json::<serde_json::Value>()
        .map(|v| decode_response(&v))
        .map_err(|e| DownloadError::Transport(format!("decoding response from {}: {e}", self.endpoint))),
      Err(ureq::Error::StatusCode(code @ (401 | 403))) => Err(DownloadError::Authentication(format!(
        "{} rejected the access token (HTTP {code})",
        self.endpoint
      ))),
      Err(e) => Err(DownloadError::Transport(format!("{}: {e}", self.endpoint))),
    }
  }
}

/// Serves pages from a JSON fixture keyed by comma-joined dimension names.
/// Page token `N` addresses the N-th page of that report.
struct FixtureReportingApi {
  reports: HashMap<String, Vec<serde_json::Value>>,
}

impl FixtureReportingApi {
  fn from_file(path: &Path) -> Result<Self> {
    let text = std::fs::read_to_string(path)
      .map_err(|e| DownloadError::Transport(format!("reading report fixture {}: {e}", path.display())))?;
    let reports = serde_json::from_str(&text)
      .map_err(|e| DownloadError::Transport(format!("parsing report fixture {}: {e}", path.display())))?;
    Ok(Self { reports })
  }
}

impl ReportingApi for FixtureReportingApi {
  fn request_page(&self, query: &ReportQuery<'_>, page_token: Option<&str>) -> Result<Page> {
    let label = query.dimensions.label();
    tracing::debug!(dimensions = %label, page_token = ?page_token, "fixture request");

    let pages = self
      .reports
      .get(&label)
      .ok_or_else(|| DownloadError::Transport(format!("no fixture report for [{label}]")))?;
    let index = match page_token {
      Some(t) => t
        .parse::<usize>()
        .map_err(|_| DownloadError::Transport(format!("invalid fixture page token {t:?}")))?,
      None => 0,
    };
    let body = pages
      .get(index)
      .ok_or_else(|| DownloadError::Transport(format!("fixture report [{label}] has no page {index}")))?;

    Ok(decode_response(body))
  }
}

/// Discover an access token: config first, then GA_ACCESS_TOKEN, then `gcloud`.
pub fn discover_access_token(configured: Option<&str>) -> Option<String> {
  if let Some(t) = configured {
    if !t.trim().is_empty() {
      return Some(t.trim().to_string());
    }
  }

  if let Ok(t) = std::env::var(ACCESS_TOKEN_ENV) {
    if !t.trim().is_empty() {
      return Some(t.trim().to_string());
    }
  }

  if let Ok(output) = std::process::Command::new("gcloud")
    .args(["auth", "application-default", "print-access-token"])
    .output()
  {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

/// Select the client for this run. Fails fast when no credentials are available.
pub fn build_api(settings: &Settings) -> Result<Box<dyn ReportingApi>> {
  if let Ok(path) = std::env::var(TEST_REPORTS_ENV) {
    tracing::debug!(fixture = %path, "using report fixture instead of HTTP");
    return Ok(Box::new(FixtureReportingApi::from_file(Path::new(&path))?));
  }

  let token = discover_access_token(settings.access_token.as_deref()).ok_or_else(|| {
    DownloadError::Authentication(format!(
      "no access token; set common:access_token or {ACCESS_TOKEN_ENV}, or run `gcloud auth application-default login`"
    ))
  })?;

  Ok(Box::new(HttpReportingApi::new(settings, token)))
}
