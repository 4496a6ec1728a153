use predicates::prelude::*;
use test_support::single_page;

use super::common::{standard_reports, standard_workspace, workspace, BATCH, RESULTS, USERS};

#[test]
fn combined_output_follows_results_order() {
  let ws = standard_workspace();
  ws.command()
    .arg("2024-01-01")
    .assert()
    .success()
    .stdout("Age,Score,ga:browser,ga:city\n40,99,N/A,N/A\n30,5,Firefox,Oslo\n");
}

#[test]
fn result_without_user_aborts_the_run() {
  let mut reports = standard_reports();
  reports[1] = (
    RESULTS,
    single_page(&[&["ga:dimension1", "ga:dimension3"], &["u2", "99"], &["u3", "7"]]),
  );
  let ws = workspace(&reports);

  ws.command()
    .arg("2024-01-01")
    .assert()
    .code(1)
    .stdout("")
    .stderr(predicate::str::contains("no user found with ga:dimension1 value of u3"));
}

#[test]
fn empty_batch_report_pads_every_row() {
  let mut reports = standard_reports();
  reports[2] = (BATCH, single_page(&[&["ga:dimension1", "ga:browser", "ga:city"]]));
  let ws = workspace(&reports);

  ws.command()
    .args(["-s", "2024-01-01"])
    .assert()
    .success()
    .stdout("40,99,N/A,N/A\n30,5,N/A,N/A\n");
}

#[test]
fn missing_report_page_aborts_the_run() {
  let mut reports = standard_reports();
  reports[0].1.truncate(1);
  let ws = workspace(&reports);

  // the second users page is missing from the fixture
  ws.command()
    .arg("2024-01-01")
    .assert()
    .failure()
    .stderr(predicate::str::contains(format!("[{USERS}]")));
}

#[test]
fn duplicate_user_warning_is_plain_text_when_piped() {
  let mut reports = standard_reports();
  reports[0] = (
    USERS,
    single_page(&[&["ga:dimension1", "ga:dimension2"], &["u1", "30"], &["u1", "31"], &["u2", "40"]]),
  );
  let ws = workspace(&reports);

  let out = ws.command().args(["-s", "2024-01-01"]).output().unwrap();
  assert!(out.status.success());
  assert_eq!(String::from_utf8_lossy(&out.stdout), "40,99,N/A,N/A\n31,5,Firefox,Oslo\n");

  let err = String::from_utf8_lossy(&out.stderr);
  assert!(err.contains("duplicate user key; keeping the last row"), "{err}");
  assert!(!err.contains('\x1b'), "{err:?}");
}
