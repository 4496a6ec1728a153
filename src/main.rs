use std::io::IsTerminal;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod dates;
mod error;
mod ext;
mod filter;
mod model;
mod pipeline;
mod render;
mod reporting;
mod stitch;
mod util;

use crate::cli::{normalize, Cli};
use crate::config::Settings;
use crate::pipeline::RunContext;

fn init_logging(debug: bool) {
  let default = if debug { "warn,ga_report_download=debug" } else { "warn" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_ansi(std::io::stderr().is_terminal())
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  init_logging(cli.debug_mode);

  // Phase 1: validate arguments against one captured "today"
  let today = chrono::Local::now().date_naive();
  let options = match normalize(cli, today) {
    Ok(o) => o,
    Err(e) if e.is_validation() => Cli::command().error(clap::error::ErrorKind::ValueValidation, e).exit(),
    Err(e) => return Err(e.into()),
  };

  // Phase 2: configuration and client, before any fetch
  let settings = Settings::load(&options.config_path)?;
  let ctx = RunContext::new(settings, options, today)?;

  // Phase 3: fetch, stitch, write
  pipeline::run(&ctx)
}
