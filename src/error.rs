// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Single error type for the fetch → aggregate → emit pipeline
// role: errors
// outputs: ReportError and the Result alias used by pipeline modules
// invariants: Every variant renders as a single line suitable for stderr
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
  #[error("failed to fetch {url}: {reason}")]
  Fetch { url: String, reason: String },

  #[error("failed to read response body from {url}: {source}")]
  Read {
    url: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse JSON: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("failed to load asset {path}: {reason}")]
  Asset { path: String, reason: String },

  #[error("failed to render heatmap: {0}")]
  Render(String),

  #[error("invalid window: start {start} is after end {end}")]
  InvalidWindow { start: String, end: String },
}

impl ReportError {
  pub fn asset(path: impl Into<String>, reason: impl ToString) -> Self {
    ReportError::Asset {
      path: path.into(),
      reason: reason.to_string(),
    }
  }
}
