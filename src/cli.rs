use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assets::ASSETS_PATH_ENV;
use crate::fetch::{incidents_url, DEFAULT_ENDPOINT};
use crate::render::OutputFormat;
use crate::util;
use crate::window::{parse_day, quarter_end, quarter_start, DateWindow};

#[derive(Parser, Debug)]
#[command(
    name = "status-page-heatmap",
    version,
    about = "Render status-page incident durations as a calendar heatmap (or JSON)",
    long_about = None
)]
pub struct Cli {
  /// Status page endpoint to scrape incidents from
  #[arg(long, default_value = DEFAULT_ENDPOINT)]
  pub endpoint: String,

  /// Incidents created after this date (YYYY-MM-DD) are included (default: current quarter start)
  #[arg(long)]
  pub from: Option<String>,

  /// Incidents created on or before this date (YYYY-MM-DD) are included (default: current quarter end)
  #[arg(long)]
  pub to: Option<String>,

  /// Output format written to stdout
  #[arg(long, value_enum, default_value_t = OutputFormat::Png)]
  pub output: OutputFormat,

  /// Directory holding colorscales/incidents.csv and fonts/Sunflower-Medium.ttf (default: bundled assets)
  #[arg(long, env = ASSETS_PATH_ENV)]
  pub assets_path: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,

  /// Override the "now" instant used for quarter defaults (hidden; tests only)
  #[arg(long = "now-override", hide = true)]
  pub now_override: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EffectiveConfig {
  pub endpoint: String,
  pub url: String,
  pub window: DateWindow,
  pub output: OutputFormat,
  pub assets_path: Option<String>,
}

pub fn normalize(cli: Cli) -> Result<EffectiveConfig> {
  let now = util::effective_now(util::parse_now_override(cli.now_override.as_deref()));
  let today = now.date_naive();

  // Defaults come from the quarter containing "now"; each bound may be overridden on its own.
  let start = match cli.from.as_deref() {
    Some(raw) => parse_day(raw)?,
    None => quarter_start(today),
  };
  let end = match cli.to.as_deref() {
    Some(raw) => parse_day(raw)?,
    None => quarter_end(today),
  };
  let window = DateWindow::new(start, end)?;

  let assets_path = cli
    .assets_path
    .filter(|p| !p.as_os_str().is_empty())
    .map(util::canonicalize_lossy);

  Ok(EffectiveConfig {
    url: incidents_url(&cli.endpoint),
    endpoint: cli.endpoint,
    window,
    output: cli.output,
    assets_path,
  })
}
