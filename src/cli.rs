use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use crate::config;
use crate::dates::DateRange;
use crate::error::{DownloadError, Result};
use crate::filter::{self, DimensionFilterClause};
use crate::render::{HeaderMode, OutputOptions};
use crate::util;

const LONG_ABOUT: &str = "Download results from Google Analytics.

The date format is YYYY-MM-DD or a relative date (today, yesterday, NdaysAgo where N is
a positive integer). The end date defaults to the start date (one day only).

Filters are optional and follow the Reporting API v4 format, with multiple filters separated
by AND (or OR):
    --filter \"ga:browser EXACT Firefox\"
    --filter \"ga:dimension1 BEGINS_WITH 0123\"
    --filter \"ga:dimension1 BEGINS_WITH 0123 AND ga:dimension2 EXACT abcdef\"

Supported filter operators: REGEXP, BEGINS_WITH, ENDS_WITH, PARTIAL, EXACT";

#[derive(Parser, Debug)]
#[command(
    name = "ga-report-download",
    version,
    about = "Download results from Google Analytics",
    long_about = LONG_ABOUT
)]
pub struct Cli {
  /// Delimit the output with this character
  #[arg(short = 'd', long, value_name = "DELIMITER")]
  pub delimiter: Option<String>,

  /// Filter the results
  #[arg(short = 'f', long, value_name = "FILTER")]
  pub filter: Option<String>,

  /// Output file (instead of standard output)
  #[arg(short = 'o', long = "output-file", value_name = "FILE")]
  pub output_file: Option<PathBuf>,

  /// Get the results only
  #[arg(short = 'r', long, group = "mode")]
  pub results: bool,

  /// Skip the header row
  #[arg(short = 's', long)]
  pub skip_header: bool,

  /// Get the user information only
  #[arg(short = 'u', long, group = "mode")]
  pub users: bool,

  /// Validate only, providing counts
  #[arg(short = 'v', long, group = "mode")]
  pub validate: bool,

  /// Debug mode that logs queries, counts and other information
  #[arg(short = 'x', long = "debug-mode")]
  pub debug_mode: bool,

  /// Add the dimension names in the header with the translations
  #[arg(long)]
  pub dimension_names: bool,

  /// Skip the translation of dimension names in the header
  #[arg(long)]
  pub skip_translation: bool,

  /// Configuration file (default: $GA_DOWNLOAD_CONFIG or ./download.toml)
  #[arg(long, value_name = "PATH")]
  pub config: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Starting date (required)
  #[arg(value_name = "START-DATE", required_unless_present = "gen_man")]
  pub start_date: Option<String>,

  /// Ending date (optional)
  #[arg(value_name = "END-DATE")]
  pub end_date: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
  Users,
  Results,
  Validate,
  Combined,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
  pub mode: Mode,
  pub date_range: DateRange,
  pub filter: Option<DimensionFilterClause>,
  pub output: OutputOptions,
  pub config_path: PathBuf,
}

fn parse_delimiter(raw: &str) -> Result<u8> {
  match raw.as_bytes() {
    [b] if b.is_ascii() => Ok(*b),
    _ => Err(DownloadError::validation(format!(
      "delimiter must be a single ASCII character, got \"{raw}\""
    ))),
  }
}

/// Validate everything that does not need the configuration file.
pub fn normalize(cli: Cli, today: NaiveDate) -> Result<RunOptions> {
  let start = cli
    .start_date
    .as_deref()
    .ok_or_else(|| DownloadError::validation("a start date is required"))?;
  let date_range = DateRange::parse(start, cli.end_date.as_deref(), today)?;

  let filter = cli.filter.as_deref().map(filter::parse_filter).transpose()?;

  let delimiter = match cli.delimiter.as_deref() {
    Some(d) => parse_delimiter(d)?,
    None => b',',
  };

  if let Some(path) = &cli.output_file {
    util::probe_output_path(path)?;
  }

  let mode = if cli.users {
    Mode::Users
  } else if cli.results {
    Mode::Results
  } else if cli.validate {
    Mode::Validate
  } else {
    Mode::Combined
  };

  let header = if cli.skip_header {
    HeaderMode::Skip
  } else if cli.skip_translation {
    HeaderMode::Raw
  } else if cli.dimension_names {
    HeaderMode::LabelsWithNames
  } else {
    HeaderMode::Labels
  };

  Ok(RunOptions {
    mode,
    date_range,
    filter,
    output: OutputOptions {
      path: cli.output_file,
      delimiter,
      header,
    },
    config_path: config::resolve_config_path(cli.config.as_deref()),
  })
}
