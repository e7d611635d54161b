// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Orchestrate one run: load assets, fetch incidents, aggregate per day, emit the report
// role: processing/orchestrator
// inputs: EffectiveConfig; an IncidentSource; a HeatmapRenderer; an output sink
// outputs: JSON or image bytes on the sink
// side_effects: One HTTP fetch (via the source); asset file reads when an assets dir is configured
// invariants:
// - Assets are loaded before any network I/O and only for image formats
// - Nothing is written to the sink unless fetch and aggregation both succeed
// errors: Propagates ReportError with the pipeline stage as context
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregate::aggregate;
use crate::assets::Assets;
use crate::cli::EffectiveConfig;
use crate::fetch::IncidentSource;
use crate::render::{emit_report, HeatmapRenderer};

pub fn run_report(
  cfg: &EffectiveConfig,
  source: &dyn IncidentSource,
  renderer: &dyn HeatmapRenderer,
  out: &mut dyn Write,
) -> Result<()> {
  let assets = if cfg.output.is_image() {
    Some(Assets::load(cfg.assets_path.as_deref().map(Path::new)).context("loading heatmap assets")?)
  } else {
    None
  };

  tracing::debug!(url = %cfg.url, start = %cfg.window.start, end = %cfg.window.end, "fetching incidents");

  let body = source.fetch(&cfg.url).context("fetching incidents")?;
  let by_day = aggregate(&body, &cfg.window).context("processing incidents")?;

  emit_report(&by_day, cfg.output, cfg.window, assets.as_ref(), renderer, out).context("writing report")?;

  Ok(())
}
