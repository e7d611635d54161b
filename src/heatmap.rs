// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Built-in calendar heatmap renderer (raster via `image`, vector as hand-written SVG)
// role: output/renderer
// inputs: Counts JSON (day → integer), RenderConfig
// outputs: png/jpeg/gif bytes or an SVG document
// invariants:
// - Grid covers every day of config.window; days missing from counts render as zero
// - Columns are Monday-start weeks; rows are weekdays Mon..Sun
// - Values <= 0 map to the first color; the largest positive value maps to the last
// - Labels (months, configured weekdays) are drawn in every format when draw_labels is set
// - Raster canvases never exceed MAX_RASTER_SIDE per side or MAX_RASTER_BYTES in total
// errors: Parse for bad counts JSON; Render for unknown day keys, oversized rasters, json format, or encoder/IO failures
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use ab_glyph::PxScale;
use base64::Engine;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::error::{ReportError, ReportResult};
use crate::render::{HeatmapRenderer, OutputFormat, RenderConfig};
use crate::window::parse_day;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// GIF and JPEG store dimensions as u16.
const MAX_RASTER_SIDE: u32 = u16::MAX as u32;
const MAX_RASTER_BYTES: u64 = 512 * 1024 * 1024;

pub struct CalendarHeatmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
  day: NaiveDate,
  col: u32,
  row: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
  x: u32,
  y: u32,
  w: u32,
  h: u32,
}

/// Grid geometry shared by the raster and SVG back ends.
struct Layout<'c, 'a> {
  config: &'c RenderConfig<'a>,
  first_monday: NaiveDate,
  weeks: u32,
}

impl<'c, 'a> Layout<'c, 'a> {
  fn new(config: &'c RenderConfig<'a>) -> Self {
    let start = config.window.start;
    let first_monday = start - Duration::days(start.weekday().num_days_from_monday() as i64);
    let span = (config.window.end - first_monday).num_days() as u32;

    Self {
      config,
      first_monday,
      weeks: span / 7 + 1,
    }
  }

  fn origin_x(&self) -> u32 {
    self.config.margin + self.config.text_width_left
  }

  fn origin_y(&self) -> u32 {
    self.config.margin + self.config.text_height_top
  }

  fn width(&self) -> u32 {
    self.origin_x() + self.weeks * self.config.box_size + self.config.margin
  }

  fn height(&self) -> u32 {
    self.origin_y() + 7 * self.config.box_size + self.config.margin
  }

  fn font_px(&self) -> u32 {
    (self.config.box_size * 2 / 5).max(8)
  }

  /// Baseline of the month label row.
  fn month_label_baseline(&self) -> u32 {
    self.origin_y().saturating_sub(self.config.month_label_y_offset)
  }

  /// Baseline of the weekday label for `row`, vertically centered in the row.
  fn weekday_label_baseline(&self, row: u32) -> u32 {
    self.origin_y() + row * self.config.box_size + (self.config.box_size + self.font_px()) / 2
  }

  fn cell(&self, day: NaiveDate) -> Cell {
    let offset = (day - self.first_monday).num_days() as u32;
    Cell {
      day,
      col: offset / 7,
      row: day.weekday().num_days_from_monday(),
    }
  }

  fn cells(&self) -> Vec<Cell> {
    self.config.window.days().map(|d| self.cell(d)).collect()
  }

  fn box_rect(&self, cell: Cell) -> Rect {
    let b = self.config.box_size;
    Rect {
      x: self.origin_x() + cell.col * b,
      y: self.origin_y() + cell.row * b,
      w: b,
      h: b,
    }
  }

  /// Stepped line separating the month that starts at `cell` from the previous one.
  fn separator(&self, cell: Cell) -> Vec<Rect> {
    let b = self.config.box_size;
    let t = self.config.month_separator_width;
    let half = t / 2;
    let x_left = (self.origin_x() + cell.col * b).saturating_sub(half);
    let x_right = (self.origin_x() + (cell.col + 1) * b).saturating_sub(half);
    let y_step = (self.origin_y() + cell.row * b).saturating_sub(half);
    let y_top = self.origin_y();
    let y_bottom = self.origin_y() + 7 * b;

    let mut out = vec![Rect {
      x: x_left,
      y: y_step,
      w: t,
      h: y_bottom - y_step,
    }];

    if cell.row > 0 {
      out.push(Rect { x: x_left, y: y_step, w: b + t, h: t });
      out.push(Rect {
        x: x_right,
        y: y_top,
        w: t,
        h: y_step + t - y_top,
      });
    }

    out
  }

  fn month_starts(&self) -> Vec<Cell> {
    self
      .cells()
      .into_iter()
      .filter(|c| c.day.day() == 1 && c.day != self.config.window.start)
      .collect()
  }

  /// Months whose label should be drawn, with the column they start in.
  fn month_labels(&self) -> Vec<(u32, &'static str)> {
    let mut out = Vec::new();
    let mut last_month = None;

    for c in self.cells() {
      if last_month != Some(c.day.month()) {
        last_month = Some(c.day.month());
        out.push((c.col, month_abbrev(c.day.month())));
      }
    }

    out
  }
}

fn month_abbrev(month: u32) -> &'static str {
  const NAMES: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
  NAMES[(month as usize + 11) % 12]
}

fn weekday_abbrev(day: Weekday) -> &'static str {
  match day {
    Weekday::Mon => "Mon",
    Weekday::Tue => "Tue",
    Weekday::Wed => "Wed",
    Weekday::Thu => "Thu",
    Weekday::Fri => "Fri",
    Weekday::Sat => "Sat",
    Weekday::Sun => "Sun",
  }
}

fn parse_counts(counts_json: &[u8]) -> ReportResult<BTreeMap<NaiveDate, i64>> {
  let raw: BTreeMap<String, i64> = serde_json::from_slice(counts_json)?;
  let mut out = BTreeMap::new();

  for (key, value) in raw {
    let day = parse_day(&key).map_err(|e| ReportError::Render(format!("{:#}", e)))?;
    out.insert(day, value);
  }

  Ok(out)
}

fn color_for(value: i64, max: i64, config: &RenderConfig<'_>) -> Rgba<u8> {
  let scale = &config.assets.color_scale;
  if value <= 0 || max <= 0 {
    return scale.at(0.0);
  }
  scale.at(value as f64 / max as f64)
}

fn fill_rect(img: &mut RgbaImage, r: Rect, color: Rgba<u8>) {
  let x_end = (r.x + r.w).min(img.width());
  let y_end = (r.y + r.h).min(img.height());

  for y in r.y..y_end {
    for x in r.x..x_end {
      img.put_pixel(x, y, color);
    }
  }
}

fn border_width(box_size: u32) -> u32 {
  (box_size / 50).max(1)
}

fn check_raster_size(layout: &Layout<'_, '_>) -> ReportResult<()> {
  let (w, h) = (layout.width(), layout.height());
  let bytes = w as u64 * h as u64 * 4;

  if w > MAX_RASTER_SIDE || h > MAX_RASTER_SIDE || bytes > MAX_RASTER_BYTES {
    return Err(ReportError::Render(format!(
      "image too large: {}x{} px for {} to {}; narrow the window or use --output svg",
      w, h, layout.config.window.start, layout.config.window.end
    )));
  }

  Ok(())
}

fn draw_raster_labels(img: &mut RgbaImage, layout: &Layout<'_, '_>) {
  let config = layout.config;
  let face = config.assets.font.face();
  let px = layout.font_px();
  let scale = PxScale::from(px as f32);

  // draw_text_mut positions the top of the line box; the label geometry is in baselines.
  for (col, name) in layout.month_labels() {
    let x = layout.origin_x() + col * config.box_size;
    let y = layout.month_label_baseline().saturating_sub(px);
    draw_text_mut(img, config.text_color, x as i32, y as i32, scale, face, name);
  }

  for day in &config.show_weekdays {
    let y = layout
      .weekday_label_baseline(day.num_days_from_monday())
      .saturating_sub(px);
    draw_text_mut(img, config.text_color, config.margin as i32, y as i32, scale, face, weekday_abbrev(*day));
  }
}

fn draw_raster(layout: &Layout<'_, '_>, counts: &BTreeMap<NaiveDate, i64>) -> RgbaImage {
  let config = layout.config;
  let max = counts.values().copied().max().unwrap_or(0);
  let mut img = RgbaImage::from_pixel(layout.width(), layout.height(), BACKGROUND);
  let bw = border_width(config.box_size);

  for cell in layout.cells() {
    let r = layout.box_rect(cell);
    let value = counts.get(&cell.day).copied().unwrap_or(0);
    fill_rect(&mut img, r, config.border_color);
    fill_rect(
      &mut img,
      Rect {
        x: r.x + bw,
        y: r.y + bw,
        w: r.w.saturating_sub(2 * bw),
        h: r.h.saturating_sub(2 * bw),
      },
      color_for(value, max, config),
    );
  }

  if config.draw_month_separator {
    for cell in layout.month_starts() {
      for r in layout.separator(cell) {
        fill_rect(&mut img, r, config.border_color);
      }
    }
  }

  if config.draw_labels {
    draw_raster_labels(&mut img, layout);
  }

  img
}

fn encode_raster(img: RgbaImage, format: OutputFormat, out: &mut dyn Write) -> ReportResult<()> {
  let render_err = |e: image::ImageError| ReportError::Render(e.to_string());
  let mut buf = Cursor::new(Vec::new());

  match format {
    OutputFormat::Png => DynamicImage::ImageRgba8(img)
      .write_to(&mut buf, ImageFormat::Png)
      .map_err(render_err)?,
    OutputFormat::Jpeg => DynamicImage::ImageRgba8(img)
      .to_rgb8()
      .write_to(&mut buf, ImageFormat::Jpeg)
      .map_err(render_err)?,
    OutputFormat::Gif => {
      let (w, h) = img.dimensions();
      let mut encoder = image::codecs::gif::GifEncoder::new_with_speed(buf.get_mut(), 10);
      encoder
        .encode(img.as_raw(), w, h, image::ExtendedColorType::Rgba8)
        .map_err(render_err)?;
    }
    OutputFormat::Json | OutputFormat::Svg => {
      return Err(ReportError::Render(format!("{:?} is not a raster format", format)));
    }
  }

  out
    .write_all(buf.get_ref())
    .map_err(|e| ReportError::Render(e.to_string()))
}

fn rgb_hex(c: Rgba<u8>) -> String {
  format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

fn svg_rect(doc: &mut String, r: Rect, fill: Rgba<u8>, extra: &str, title: Option<String>) {
  let open = format!(
    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"{}",
    r.x,
    r.y,
    r.w,
    r.h,
    rgb_hex(fill),
    extra
  );

  match title {
    Some(t) => doc.push_str(&format!("{}><title>{}</title></rect>\n", open, t)),
    None => doc.push_str(&format!("{}/>\n", open)),
  }
}

fn draw_svg(layout: &Layout<'_, '_>, counts: &BTreeMap<NaiveDate, i64>) -> String {
  let config = layout.config;
  let max = counts.values().copied().max().unwrap_or(0);
  let font = &config.assets.font;
  let font_size = layout.font_px();
  let mut doc = String::new();

  doc.push_str(&format!(
    "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
    w = layout.width(),
    h = layout.height()
  ));

  let encoded = base64::engine::general_purpose::STANDARD.encode(&font.bytes);
  doc.push_str(&format!(
    "<style>@font-face {{ font-family: \"{}\"; src: url(data:{};base64,{}); }}</style>\n",
    font.family,
    font.mime(),
    encoded
  ));

  svg_rect(
    &mut doc,
    Rect {
      x: 0,
      y: 0,
      w: layout.width(),
      h: layout.height(),
    },
    BACKGROUND,
    "",
    None,
  );

  let stroke = format!(
    " stroke=\"{}\" stroke-width=\"{}\"",
    rgb_hex(config.border_color),
    border_width(config.box_size)
  );

  for cell in layout.cells() {
    let value = counts.get(&cell.day).copied().unwrap_or(0);
    svg_rect(
      &mut doc,
      layout.box_rect(cell),
      color_for(value, max, config),
      &stroke,
      Some(format!("{}: {} min", cell.day, value)),
    );
  }

  if config.draw_month_separator {
    for cell in layout.month_starts() {
      for r in layout.separator(cell) {
        svg_rect(&mut doc, r, config.border_color, "", None);
      }
    }
  }

  if config.draw_labels {
    let text_attrs = format!(
      "font-family=\"{}, sans-serif\" font-size=\"{}\" fill=\"{}\"",
      font.family,
      font_size,
      rgb_hex(config.text_color)
    );

    for (col, name) in layout.month_labels() {
      doc.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" {}>{}</text>\n",
        layout.origin_x() + col * config.box_size,
        layout.month_label_baseline(),
        text_attrs,
        name
      ));
    }

    for day in &config.show_weekdays {
      let row = day.num_days_from_monday();
      doc.push_str(&format!(
        "<text x=\"{}\" y=\"{}\" {}>{}</text>\n",
        config.margin,
        layout.weekday_label_baseline(row),
        text_attrs,
        weekday_abbrev(*day)
      ));
    }
  }

  doc.push_str("</svg>\n");
  doc
}

impl HeatmapRenderer for CalendarHeatmap {
  fn render(&self, counts_json: &[u8], config: &RenderConfig<'_>, out: &mut dyn Write) -> ReportResult<()> {
    let mut counts = parse_counts(counts_json)?;
    let layout = Layout::new(config);

    let before = counts.len();
    counts.retain(|d, _| *d >= config.window.start && *d <= config.window.end);
    if counts.len() < before {
      tracing::warn!(outside = before - counts.len(), "ignoring counts outside the rendered window");
    }

    match config.format {
      OutputFormat::Svg => out
        .write_all(draw_svg(&layout, &counts).as_bytes())
        .map_err(|e| ReportError::Render(e.to_string())),
      OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Gif => {
        check_raster_size(&layout)?;
        encode_raster(draw_raster(&layout, &counts), config.format, out)
      }
      OutputFormat::Json => Err(ReportError::Render("json is not an image format".to_string())),
    }
  }
}
