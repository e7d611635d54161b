use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod aggregate;
mod assets;
mod cli;
mod error;
mod fetch;
mod heatmap;
mod model;
mod pipeline;
mod render;
mod util;
mod window;

use crate::cli::{normalize, Cli};

fn run() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI (resolves the date window)
  let cfg = normalize(cli)?;
  tracing::debug!(config = ?cfg, "effective configuration");

  // Phase 2: fetch → aggregate → emit
  let stdout = std::io::stdout();
  let mut out = stdout.lock();
  pipeline::run_report(&cfg, &fetch::HttpSource::new(), &heatmap::CalendarHeatmap, &mut out)
}

fn main() -> ExitCode {
  util::init_logging();

  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::debug!(error = ?err, "run failed");
      eprintln!("error: {:#}", err);
      ExitCode::FAILURE
    }
  }
}
