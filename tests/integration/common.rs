use serde_json::Value;
use test_support::{read_fixture_text, report_page, single_page, Workspace};

pub const USERS: &str = "ga:dimension1,ga:dimension2";
pub const RESULTS: &str = "ga:dimension1,ga:dimension3";
pub const BATCH: &str = "ga:dimension1,ga:browser,ga:city";

/// Users arrive over two pages; results and the batch report in one.
pub fn standard_reports() -> Vec<(&'static str, Vec<Value>)> {
  vec![
    (
      USERS,
      vec![
        report_page(&["ga:dimension1", "ga:dimension2"], &[&["u1", "30"]], Some("1")),
        report_page(&["ga:dimension1", "ga:dimension2"], &[&["u2", "40"]], None),
      ],
    ),
    (
      RESULTS,
      single_page(&[&["ga:dimension1", "ga:dimension3"], &["u2", "99"], &["u1", "5"]]),
    ),
    (
      BATCH,
      single_page(&[&["ga:dimension1", "ga:browser", "ga:city"], &["u1", "Firefox", "Oslo"]]),
    ),
  ]
}

pub fn workspace(reports: &[(&str, Vec<Value>)]) -> Workspace {
  Workspace::new(&read_fixture_text("download.toml"), reports)
}

pub fn standard_workspace() -> Workspace {
  workspace(&standard_reports())
}
