//! test-support: helpers for driving the `ga-report-download` binary offline.
//!
//! The binary is pointed at a JSON report fixture through `GA_DOWNLOAD_TEST_REPORTS`
//! and at a temp `download.toml` through `--config`, so no network or credentials are needed.
//!
//! ```rust,ignore
//! use test_support::{cmd_bin, Workspace};
//!
//! let ws = Workspace::new(CONFIG, &reports);
//! ws.command().arg("today").assert().success();
//! ```

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

pub const BIN: &str = "ga-report-download";
pub const TEST_REPORTS_ENV: &str = "GA_DOWNLOAD_TEST_REPORTS";

/// Initialize `tracing` once, honoring `RUST_LOG` and writing via the test writer.
pub fn init_tracing() {
  static INIT: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env()
      .or_else(|_| EnvFilter::try_new("warn"))
      .unwrap();
    let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
  });
  Lazy::force(&INIT);
}

/// Return the path to the repository's `tests/fixtures` directory.
pub fn fixtures_dir() -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .parent()
    .map(|tests| tests.join("fixtures"))
    .unwrap_or_else(|| PathBuf::from("tests/fixtures"))
}

/// Read a UTF-8 text fixture into a string.
pub fn read_fixture_text<P: AsRef<Path>>(rel_path: P) -> String {
  let path = fixtures_dir().join(rel_path);
  std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()))
}

/// The binary under test as an `assert_cmd` command with a clean environment for our variables.
pub fn cmd_bin() -> assert_cmd::Command {
  init_tracing();
  let mut cmd = assert_cmd::Command::cargo_bin(BIN).expect("binary target not found");
  cmd
    .env_remove("RUST_LOG")
    .env_remove("GA_ACCESS_TOKEN")
    .env_remove("GA_DOWNLOAD_CONFIG")
    .env_remove(TEST_REPORTS_ENV);
  cmd
}

/// One `batchGet` response body holding a single report page.
pub fn report_page(header: &[&str], rows: &[&[&str]], next_page_token: Option<&str>) -> Value {
  let rows: Vec<Value> = rows
    .iter()
    .map(|r| json!({ "dimensions": r, "metrics": [{ "values": ["1"] }] }))
    .collect();

  let mut report = json!({
    "columnHeader": {
      "dimensions": header,
      "metricHeader": { "metricHeaderEntries": [{ "name": "ga:users", "type": "INTEGER" }] }
    },
    "data": { "rows": rows, "rowCount": rows.len() }
  });
  if let Some(token) = next_page_token {
    report["nextPageToken"] = Value::String(token.to_string());
  }

  json!({ "reports": [report] })
}

/// A single-page report whose first row is the header.
pub fn single_page(table: &[&[&str]]) -> Vec<Value> {
  let (header, rows) = table.split_first().expect("table needs a header row");
  vec![report_page(header, rows, None)]
}

/// Temp directory holding a config file and a report fixture.
pub struct Workspace {
  pub dir: tempfile::TempDir,
  pub config: PathBuf,
  pub reports: PathBuf,
}

impl Workspace {
  /// `reports` maps comma-joined dimension names to the pages of that report.
  pub fn new(config: &str, reports: &[(&str, Vec<Value>)]) -> Self {
    let dir = tempfile::tempdir().expect("create tempdir");
    let config_path = dir.path().join("download.toml");
    std::fs::write(&config_path, config).expect("write config");

    let map: serde_json::Map<String, Value> = reports
      .iter()
      .map(|(label, pages)| (label.to_string(), Value::Array(pages.clone())))
      .collect();
    let reports_path = dir.path().join("reports.json");
    std::fs::write(&reports_path, Value::Object(map).to_string()).expect("write report fixture");

    Self {
      dir,
      config: config_path,
      reports: reports_path,
    }
  }

  pub fn path(&self, rel: &str) -> PathBuf {
    self.dir.path().join(rel)
  }

  /// The binary wired to this workspace's config and report fixture.
  pub fn command(&self) -> assert_cmd::Command {
    let mut cmd = cmd_bin();
    cmd
      .env(TEST_REPORTS_ENV, &self.reports)
      .arg("--config")
      .arg(&self.config)
      .current_dir(self.dir.path());
    cmd
  }
}
