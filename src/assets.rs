// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Load the heatmap font and color scale once, from the bundled defaults or an assets directory
// role: assets/loading
// inputs: Optional assets directory (CALENDAR_HEATMAP_ASSETS_PATH or --assets-path)
// outputs: Immutable Assets handed to the report emitter
// side_effects: Reads {dir}/colorscales/incidents.csv and {dir}/fonts/Sunflower-Medium.ttf when a directory is given
// invariants:
// - A loaded ColorScale has at least one color
// - A loaded font parses as TrueType/OpenType (the bundled default is DejaVu Sans)
// errors: Asset for missing, unreadable or malformed files; never falls back once a directory is configured
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::fmt;
use std::path::Path;

use ab_glyph::FontArc;
use image::Rgba;

use crate::error::{ReportError, ReportResult};

pub const ASSETS_PATH_ENV: &str = "CALENDAR_HEATMAP_ASSETS_PATH";
pub const COLOR_SCALE_FILE: &str = "incidents.csv";
pub const FONT_FILE: &str = "Sunflower-Medium.ttf";
pub const FONT_FAMILY: &str = "Sunflower";
pub const BUNDLED_FONT_FAMILY: &str = "DejaVu Sans";

const DEFAULT_COLOR_SCALE: &str = include_str!("../assets/colorscales/incidents.csv");
const BUNDLED_FONT: &[u8] = include_bytes!("../assets/fonts/DejaVuSans.ttf");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScale {
  colors: Vec<Rgba<u8>>,
}

impl ColorScale {
  /// Parse `r,g,b[,a]` rows; a leading non-numeric header row is skipped.
  pub fn from_csv(text: &str) -> Result<Self, String> {
    let mut colors = Vec::new();

    for (idx, line) in text.lines().enumerate() {
      let line = line.trim();

      if line.is_empty() {
        continue;
      }

      let fields: Vec<&str> = line.split(',').map(str::trim).collect();

      if idx == 0 && fields.iter().all(|f| f.chars().all(|c| c.is_ascii_alphabetic())) {
        continue;
      }

      if !(3..=4).contains(&fields.len()) {
        return Err(format!("line {}: expected r,g,b[,a], got {:?}", idx + 1, line));
      }

      let mut channels = [0u8, 0, 0, 255];

      for (slot, raw) in channels.iter_mut().zip(fields.iter()) {
        *slot = raw
          .parse::<u8>()
          .map_err(|e| format!("line {}: {:?}: {}", idx + 1, raw, e))?;
      }

      colors.push(Rgba(channels));
    }

    if colors.is_empty() {
      return Err("color scale has no colors".to_string());
    }

    Ok(Self { colors })
  }

  pub fn color_count(&self) -> usize {
    self.colors.len()
  }

  /// Color for `fraction` in `[0, 1]`; out-of-range values clamp to the ends.
  pub fn at(&self, fraction: f64) -> Rgba<u8> {
    let last = self.colors.len() - 1;
    let f = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
    let idx = (f * last as f64).round() as usize;
    self.colors[idx.min(last)]
  }
}

/// A parsed font plus its raw bytes (the bytes are embedded in SVG output).
#[derive(Clone)]
pub struct FontAsset {
  pub family: String,
  pub bytes: Vec<u8>,
  face: FontArc,
}

impl fmt::Debug for FontAsset {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FontAsset")
      .field("family", &self.family)
      .field("bytes", &self.bytes.len())
      .finish()
  }
}

impl FontAsset {
  pub fn bundled() -> Result<Self, String> {
    Self::from_bytes(BUNDLED_FONT_FAMILY, BUNDLED_FONT.to_vec())
  }

  /// Parse `bytes` as a TrueType/OpenType font; anything the glyph parser rejects is an error.
  pub fn from_bytes(family: &str, bytes: Vec<u8>) -> Result<Self, String> {
    let face = FontArc::try_from_vec(bytes.clone()).map_err(|e| format!("not a usable font: {}", e))?;

    Ok(Self {
      family: family.to_string(),
      bytes,
      face,
    })
  }

  pub fn face(&self) -> &FontArc {
    &self.face
  }

  pub fn mime(&self) -> &'static str {
    if self.bytes.starts_with(b"OTTO") {
      "font/otf"
    } else {
      "font/ttf"
    }
  }
}

#[derive(Debug, Clone)]
pub struct Assets {
  pub font: FontAsset,
  pub color_scale: ColorScale,
}

impl Assets {
  pub fn bundled() -> ReportResult<Self> {
    let color_scale = ColorScale::from_csv(DEFAULT_COLOR_SCALE)
      .map_err(|e| ReportError::asset(format!("<bundled>/colorscales/{COLOR_SCALE_FILE}"), e))?;

    let font = FontAsset::bundled().map_err(|e| ReportError::asset("<bundled>/fonts/DejaVuSans.ttf", e))?;

    Ok(Self { font, color_scale })
  }

  pub fn from_dir(dir: &Path) -> ReportResult<Self> {
    let scale_path = dir.join("colorscales").join(COLOR_SCALE_FILE);
    let scale_text =
      std::fs::read_to_string(&scale_path).map_err(|e| ReportError::asset(scale_path.display().to_string(), e))?;
    let color_scale =
      ColorScale::from_csv(&scale_text).map_err(|e| ReportError::asset(scale_path.display().to_string(), e))?;

    let font_path = dir.join("fonts").join(FONT_FILE);
    let font_bytes = std::fs::read(&font_path).map_err(|e| ReportError::asset(font_path.display().to_string(), e))?;
    let font =
      FontAsset::from_bytes(FONT_FAMILY, font_bytes).map_err(|e| ReportError::asset(font_path.display().to_string(), e))?;

    Ok(Self { font, color_scale })
  }

  /// Load from `dir` when configured, otherwise use the bundled defaults.
  pub fn load(dir: Option<&Path>) -> ReportResult<Self> {
    let assets = match dir {
      Some(d) => Self::from_dir(d)?,
      None => Self::bundled()?,
    };

    tracing::debug!(
      dir = ?dir,
      colors = assets.color_scale.color_count(),
      font = %assets.font.family,
      "loaded heatmap assets"
    );

    Ok(assets)
  }
}
