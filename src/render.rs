// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Emit the aggregate either as JSON or through a heatmap renderer with the fixed visual configuration
// role: output/emitter
// inputs: DailyDurationMap, OutputFormat, DateWindow, Assets (image formats only)
// outputs: Bytes written to the provided sink (stdout in the binary)
// invariants:
// - json output is the map itself: sorted day keys, integer minute values
// - RenderConfig::standard is a pure function of (format, window, assets)
// - the renderer receives the map re-serialized as JSON, never the in-memory map
// errors: Parse on (re)serialization failures; Render for sink/encoder failures; renderer errors bubble unchanged
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Write;

use chrono::Weekday;
use clap::ValueEnum;
use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::assets::Assets;
use crate::error::{ReportError, ReportResult};
use crate::model::DailyDurationMap;
use crate::window::DateWindow;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
  Json,
  Png,
  Jpeg,
  Gif,
  Svg,
}

impl OutputFormat {
  pub fn is_image(self) -> bool {
    !matches!(self, OutputFormat::Json)
  }
}

/// Visual parameters handed verbatim to the heatmap renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig<'a> {
  pub format: OutputFormat,
  pub window: DateWindow,
  pub draw_labels: bool,
  pub draw_month_separator: bool,
  pub margin: u32,
  pub box_size: u32,
  pub month_separator_width: u32,
  pub month_label_y_offset: u32,
  pub text_width_left: u32,
  pub text_height_top: u32,
  pub text_color: Rgba<u8>,
  pub border_color: Rgba<u8>,
  pub show_weekdays: Vec<Weekday>,
  pub locale: &'static str,
  pub assets: &'a Assets,
}

impl<'a> RenderConfig<'a> {
  pub fn standard(format: OutputFormat, window: DateWindow, assets: &'a Assets) -> Self {
    Self {
      format,
      window,
      draw_labels: true,
      draw_month_separator: true,
      margin: 90,
      box_size: 350,
      month_separator_width: 15,
      month_label_y_offset: 50,
      text_width_left: 300,
      text_height_top: 200,
      text_color: Rgba([100, 100, 100, 255]),
      border_color: Rgba([200, 200, 200, 255]),
      show_weekdays: vec![Weekday::Mon, Weekday::Wed, Weekday::Fri],
      locale: "en_US",
      assets,
    }
  }
}

// --- Trait seam for the renderer ---
pub trait HeatmapRenderer {
  /// Render `counts_json` (a JSON object of day → integer) in `config.format`.
  fn render(&self, counts_json: &[u8], config: &RenderConfig<'_>, out: &mut dyn Write) -> ReportResult<()>;
}

pub fn write_json(map: &DailyDurationMap, out: &mut dyn Write) -> ReportResult<()> {
  let text = serde_json::to_string_pretty(map)?;
  writeln!(out, "{}", text).map_err(|e| ReportError::Render(e.to_string()))
}

/// Write the report for `map` in `format` to `out`.
///
/// `assets` is only consulted for image formats; JSON output never needs them.
pub fn emit_report(
  map: &DailyDurationMap,
  format: OutputFormat,
  window: DateWindow,
  assets: Option<&Assets>,
  renderer: &dyn HeatmapRenderer,
  out: &mut dyn Write,
) -> ReportResult<()> {
  if !format.is_image() {
    return write_json(map, out);
  }

  let assets = assets.ok_or_else(|| ReportError::asset("<unset>", "image output requested without loaded assets"))?;
  let counts_json = serde_json::to_vec(map)?;
  let config = RenderConfig::standard(format, window, assets);

  tracing::debug!(?format, days = map.len(), "rendering heatmap");

  renderer.render(&counts_json, &config, out)?;
  out.flush().map_err(|e| ReportError::Render(e.to_string()))
}
