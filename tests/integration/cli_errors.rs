use predicates::prelude::*;
use test_support::{cmd_bin, read_fixture_text, Workspace};

use super::common::{standard_reports, standard_workspace};

#[test]
fn malformed_start_date_is_a_usage_error() {
  let ws = standard_workspace();
  ws.command()
    .arg("2024/01/01")
    .assert()
    .code(2)
    .stderr(predicate::str::contains("invalid start date format: \"2024/01/01\""));
}

#[test]
fn end_before_start_is_a_usage_error() {
  let ws = standard_workspace();
  ws.command().args(["2024-02-01", "2024-01-01"]).assert().code(2);
}

#[test]
fn mode_flags_conflict() {
  let ws = standard_workspace();
  ws.command().args(["-u", "-r", "today"]).assert().code(2);
}

#[test]
fn missing_start_date_is_a_usage_error() {
  cmd_bin().assert().code(2);
}

#[test]
fn invalid_filter_is_a_usage_error() {
  let ws = standard_workspace();
  ws.command()
    .args(["-f", "browser is Firefox", "today"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Invalid filter arguments: browser is Firefox"));
}

#[test]
fn unwritable_output_file_is_a_usage_error() {
  let ws = standard_workspace();
  let out = ws.path("missing/out.csv");
  ws.command()
    .args(["-o", out.to_str().unwrap(), "today"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Invalid output file"));
}

#[test]
fn mismatched_join_dimension_is_a_config_error() {
  let config = read_fixture_text("download.toml").replace(
    "[user-dimensions]\n1 = \"dimension1\"",
    "[user-dimensions]\n1 = \"dimension9\"",
  );
  let ws = Workspace::new(&config, &standard_reports());
  ws.command()
    .arg("today")
    .assert()
    .code(1)
    .stderr(predicate::str::contains("First dimension of user and result groups must be equal"));
}

#[test]
fn missing_required_option_is_named() {
  let config = read_fixture_text("download.toml").replace("invalid_value = \"N/A\"\n", "");
  let ws = Workspace::new(&config, &standard_reports());
  ws.command()
    .arg("today")
    .assert()
    .failure()
    .stderr(predicate::str::contains("Missing configuration option: common:invalid_value"));
}

#[test]
fn missing_config_file_fails_before_fetching() {
  let ws = standard_workspace();
  let mut cmd = cmd_bin();
  cmd
    .env(test_support::TEST_REPORTS_ENV, &ws.reports)
    .current_dir(ws.dir.path())
    .args(["--config", "nope.toml", "today"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Unable to read configuration file"));
}
