// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Fetch the raw incident list from a status page
// role: io/http
// inputs: Status page base endpoint
// outputs: Fully buffered response body bytes
// side_effects: One blocking HTTP GET per call
// invariants:
// - URL is always {endpoint}/api/v2/incidents.json (trailing slashes on endpoint trimmed)
// - No retries, no auth headers, no query parameters
// errors: Fetch for transport failures and non-2xx statuses; Read when the body cannot be drained
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::io::Read;

use crate::error::{ReportError, ReportResult};

pub const DEFAULT_ENDPOINT: &str = "https://status.verity.gumgum.com";
pub const INCIDENTS_PATH: &str = "/api/v2/incidents.json";

pub fn incidents_url(endpoint: &str) -> String {
  format!("{}{}", endpoint.trim_end_matches('/'), INCIDENTS_PATH)
}

// --- Trait seam for the transport ---
pub trait IncidentSource {
  fn fetch(&self, url: &str) -> ReportResult<Vec<u8>>;
}

pub struct HttpSource {
  agent: ureq::Agent,
}

impl HttpSource {
  pub fn new() -> Self {
    let agent = ureq::AgentBuilder::new()
      .user_agent(concat!("status-page-heatmap/", env!("CARGO_PKG_VERSION")))
      .build();

    Self { agent }
  }
}

impl Default for HttpSource {
  fn default() -> Self {
    Self::new()
  }
}

impl IncidentSource for HttpSource {
  fn fetch(&self, url: &str) -> ReportResult<Vec<u8>> {
    let response = match self.agent.get(url).call() {
      Ok(resp) => resp,
      Err(ureq::Error::Status(code, resp)) => {
        return Err(ReportError::Fetch {
          url: url.to_string(),
          reason: format!("HTTP {} {}", code, resp.status_text()),
        })
      }
      Err(ureq::Error::Transport(t)) => {
        return Err(ReportError::Fetch {
          url: url.to_string(),
          reason: t.to_string(),
        })
      }
    };

    let mut body = Vec::new();

    response
      .into_reader()
      .read_to_end(&mut body)
      .map_err(|source| ReportError::Read {
        url: url.to_string(),
        source,
      })?;

    tracing::debug!(url, bytes = body.len(), "fetched incidents");

    Ok(body)
  }
}
