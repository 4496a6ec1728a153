// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one run: fetch the reports a mode needs, stitch them, and hand the table to the renderer
// role: processing/orchestrator
// inputs: RunContext (Settings, RunOptions, reporting client, captured "today")
// outputs: Delimited output (file or stdout) or validation counts on stdout
// side_effects: Network calls through the reporting client; writes output
// invariants:
// - all state is built once in RunContext::new before the first fetch
// - fetch order is users, results, then each batch set in configured order
// - batch requests are the stitch dimensions followed by the batch dimensions
// errors: The first error aborts the run; nothing is written after a failure
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::Result;
use chrono::NaiveDate;

use crate::cli::{Mode, RunOptions};
use crate::config::Settings;
use crate::error::DownloadError;
use crate::model::{DimensionSet, ReportTable};
use crate::render::output_table;
use crate::reporting::{build_api, fetch_full_report, ReportQuery, ReportingApi};
use crate::stitch::{combine, StitchPlan};

/// Everything a run needs, initialized once up front.
pub struct RunContext {
  pub settings: Settings,
  pub options: RunOptions,
  pub today: NaiveDate,
  api: Box<dyn ReportingApi>,
}

impl RunContext {
  pub fn new(settings: Settings, options: RunOptions, today: NaiveDate) -> Result<Self, DownloadError> {
    let api = build_api(&settings)?;
    Ok(Self::with_api(settings, options, today, api))
  }

  pub fn with_api(settings: Settings, options: RunOptions, today: NaiveDate, api: Box<dyn ReportingApi>) -> Self {
    Self {
      settings,
      options,
      today,
      api,
    }
  }

  /// Fetch one complete report for `dimensions` over the run's dates and filter.
  pub fn fetch(&self, dimensions: &DimensionSet) -> Result<ReportTable, DownloadError> {
    let query = ReportQuery {
      dimensions,
      date_range: &self.options.date_range,
      filter: self.options.filter.as_ref(),
    };
    let table = fetch_full_report(self.api.as_ref(), &query, self.settings.max_pages)?;
    tracing::debug!(dimensions = %dimensions.label(), rows = table.row_count(), "report fetched");
    Ok(table)
  }

  fn plan(&self) -> StitchPlan<'_> {
    StitchPlan {
      policy: self.settings.policy,
      stitch_dimensions: &self.settings.stitch_dimensions,
      results_dimensions: &self.settings.results_dimensions,
      sentinel: &self.settings.invalid_value,
    }
  }
}

/// Users, results and every batch report stitched into one table.
pub fn download_combined(ctx: &RunContext) -> Result<ReportTable, DownloadError> {
  let users = ctx.fetch(&ctx.settings.user_dimensions)?;
  let results = ctx.fetch(&ctx.settings.results_dimensions)?;

  let auxiliary = ctx
    .settings
    .batch_dimensions
    .iter()
    .map(|batch| ctx.fetch(&batch.prefixed_with(&ctx.settings.stitch_dimensions)))
    .collect::<Result<Vec<_>, _>>()?;

  let combined = combine(&users, &results, &auxiliary, &ctx.plan())?;
  debug_assert_eq!(combined.row_count(), results.row_count());

  Ok(combined)
}

/// Data row counts of the users and results reports.
pub fn validate_counts(ctx: &RunContext) -> Result<(usize, usize), DownloadError> {
  let users = ctx.fetch(&ctx.settings.user_dimensions)?;
  let results = ctx.fetch(&ctx.settings.results_dimensions)?;
  Ok((users.row_count(), results.row_count()))
}

pub fn run(ctx: &RunContext) -> Result<()> {
  tracing::debug!(
    mode = ?ctx.options.mode,
    start = %ctx.options.date_range.start_date,
    end = %ctx.options.date_range.end_date,
    today = %ctx.today,
    "run"
  );

  let labels = &ctx.settings.custom_dimensions;
  let output = &ctx.options.output;

  match ctx.options.mode {
    Mode::Users => {
      let users = ctx.fetch(&ctx.settings.user_dimensions)?;
      output_table(&users, labels, output)?;
    }
    Mode::Results => {
      let results = ctx.fetch(&ctx.settings.results_dimensions)?;
      output_table(&results, labels, output)?;
    }
    Mode::Validate => {
      let (users, results) = validate_counts(ctx)?;
      println!("Total number of users: {}", users);
      println!("Total number of results: {}", results);
    }
    Mode::Combined => {
      let combined = download_combined(ctx)?;
      output_table(&combined, labels, output)?;
    }
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::tests_support::minimal_settings;
  use crate::dates::DateRange;
  use crate::model::Page;
  use crate::render::OutputOptions;
  use std::cell::RefCell;
  use std::collections::HashMap;
  use std::rc::Rc;

  /// Single-page reports keyed by dimension label; records the request order.
  struct TableApi {
    tables: HashMap<String, Vec<Vec<&'static str>>>,
    requested: Rc<RefCell<Vec<String>>>,
  }

  impl ReportingApi for TableApi {
    fn request_page(&self, query: &ReportQuery<'_>, _page_token: Option<&str>) -> Result<Page, DownloadError> {
      let label = query.dimensions.label();
      self.requested.borrow_mut().push(label.clone());
      let rows = self
        .tables
        .get(&label)
        .ok_or_else(|| DownloadError::Transport(format!("unexpected report {label}")))?;
      let mut rows = rows.iter().map(|r| r.iter().map(|s| s.to_string()).collect::<Vec<String>>());
      Ok(Page {
        header: rows.next().unwrap_or_default(),
        rows: rows.collect(),
        next_page_token: None,
      })
    }
  }

  fn dims(names: &[&str]) -> DimensionSet {
    DimensionSet::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
  }

  fn context(tables: Vec<(&str, Vec<Vec<&'static str>>)>) -> (RunContext, Rc<RefCell<Vec<String>>>) {
    let mut settings = minimal_settings();
    settings.user_dimensions = dims(&["ga:id", "ga:age"]);
    settings.results_dimensions = dims(&["ga:id", "ga:score"]);
    settings.stitch_dimensions = vec!["ga:id".into()];
    settings.batch_dimensions = vec![dims(&["ga:browser"])];

    let options = RunOptions {
      mode: Mode::Combined,
      date_range: DateRange::parse("today", None, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap(),
      filter: None,
      output: OutputOptions::default(),
      config_path: "download.toml".into(),
    };

    let requested = Rc::new(RefCell::new(Vec::new()));
    let api = Box::new(TableApi {
      tables: tables.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
      requested: Rc::clone(&requested),
    });
    let ctx = RunContext::with_api(settings, options, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), api);
    (ctx, requested)
  }

  fn standard_tables() -> Vec<(&'static str, Vec<Vec<&'static str>>)> {
    vec![
      ("ga:id,ga:age", vec![vec!["ga:id", "ga:age"], vec!["u1", "30"], vec!["u2", "40"]]),
      ("ga:id,ga:score", vec![vec!["ga:id", "ga:score"], vec!["u2", "99"], vec!["u1", "5"]]),
      ("ga:id,ga:browser", vec![vec!["ga:id", "ga:browser"], vec!["u2", "Chrome"]]),
    ]
  }

  #[test]
  fn combined_fetches_in_order_and_stitches() {
    let (ctx, requested) = context(standard_tables());

    let table = download_combined(&ctx).unwrap();

    assert_eq!(table.header(), &["ga:age", "ga:score", "ga:browser"]);
    assert_eq!(table.rows()[0], ["40", "99", "Chrome"]);
    assert_eq!(table.rows()[1], ["30", "5", "N/A"]);

    assert_eq!(*requested.borrow(), ["ga:id,ga:age", "ga:id,ga:score", "ga:id,ga:browser"]);
  }

  #[test]
  fn validate_counts_data_rows() {
    let (ctx, _) = context(standard_tables());
    assert_eq!(validate_counts(&ctx).unwrap(), (2, 2));
  }

  #[test]
  fn missing_user_aborts_combined_run() {
    let mut tables = standard_tables();
    tables[1].1.push(vec!["u3", "1"]);
    let (ctx, _) = context(tables);

    let err = download_combined(&ctx).unwrap_err();
    assert!(err.to_string().contains("u3"));
  }
}
