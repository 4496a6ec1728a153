use predicates::prelude::*;

use super::common::standard_workspace;

#[test]
fn users_only_writes_the_full_users_report() {
  let ws = standard_workspace();
  ws.command()
    .args(["-u", "2024-01-01"])
    .assert()
    .success()
    .stdout("Student ID,Age\nu1,30\nu2,40\n");
}

#[test]
fn results_only_with_raw_header() {
  let ws = standard_workspace();
  ws.command()
    .args(["-r", "--skip-translation", "2024-01-01", "2024-01-31"])
    .assert()
    .success()
    .stdout("ga:dimension1,ga:dimension3\nu2,99\nu1,5\n");
}

#[test]
fn validate_prints_counts() {
  let ws = standard_workspace();
  ws.command()
    .args(["-v", "yesterday"])
    .assert()
    .success()
    .stdout("Total number of users: 2\nTotal number of results: 2\n");
}

#[test]
fn delimiter_and_skipped_header() {
  let ws = standard_workspace();
  ws.command()
    .args(["-u", "-s", "-d", ";", "7daysAgo", "today"])
    .assert()
    .success()
    .stdout("u1;30\nu2;40\n");
}

#[test]
fn dimension_names_accompany_labels() {
  let ws = standard_workspace();
  ws.command()
    .args(["-r", "--dimension-names", "today"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("Student ID (ga:dimension1),Score (ga:dimension3)\n"));
}

#[test]
fn output_file_reports_completion() {
  let ws = standard_workspace();
  let out = ws.path("out.csv");
  ws.command()
    .args(["-o", out.to_str().unwrap(), "2024-01-01"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Download complete, 3 rows, output file: "));

  let text = std::fs::read_to_string(&out).unwrap();
  assert_eq!(text, "Age,Score,ga:browser,ga:city\n40,99,N/A,N/A\n30,5,Firefox,Oslo\n");
}

#[test]
fn config_path_from_environment() {
  let ws = standard_workspace();
  let mut cmd = test_support::cmd_bin();
  cmd
    .env(test_support::TEST_REPORTS_ENV, &ws.reports)
    .env("GA_DOWNLOAD_CONFIG", &ws.config)
    .args(["-v", "today"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Total number of users: 2"));
}
