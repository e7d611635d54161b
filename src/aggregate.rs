// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Reduce a raw incident list into per-day resolution minutes for one window
// role: aggregation/core
// inputs: Raw incidents.json bytes; DateWindow
// outputs: DailyDurationMap (only days with at least one qualifying incident)
// invariants:
// - Parsing is all-or-nothing: any malformed element fails the whole call
// - Every key lies inside the window (see DateWindow::contains)
// - Negative durations are summed as-is; absent days are not zero-filled
// errors: Parse for malformed JSON or mistyped/missing timestamps
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use crate::error::ReportResult;
use crate::model::{DailyDurationMap, Incident, IncidentList};
use crate::window::DateWindow;

pub fn parse_incidents(raw: &[u8]) -> ReportResult<Vec<Incident>> {
  let list: IncidentList = serde_json::from_slice(raw)?;
  Ok(list.incidents)
}

pub fn sum_by_day<'a, I>(incidents: I, window: &DateWindow) -> DailyDurationMap
where
  I: IntoIterator<Item = &'a Incident>,
{
  let mut out = DailyDurationMap::new();

  for incident in incidents {
    if window.contains(&incident.created_at) {
      *out.entry(incident.day_key()).or_insert(0) += incident.duration_minutes();
    }
  }

  out
}

pub fn aggregate(raw: &[u8], window: &DateWindow) -> ReportResult<DailyDurationMap> {
  let incidents = parse_incidents(raw)?;
  let by_day = sum_by_day(&incidents, window);

  tracing::debug!(
    parsed = incidents.len(),
    days = by_day.len(),
    start = %window.start,
    end = %window.end,
    "aggregated incidents"
  );

  Ok(by_day)
}
