use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Calendar day (`YYYY-MM-DD`) → total resolution minutes.
pub type DailyDurationMap = BTreeMap<String, i64>;

/// Top-level shape of `GET /api/v2/incidents.json`; other fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentList {
  pub incidents: Vec<Incident>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
  pub created_at: DateTime<FixedOffset>,
  pub resolved_at: DateTime<FixedOffset>,
}

impl Incident {
  /// Whole minutes between creation and resolution, truncated toward zero.
  /// Negative when `resolved_at` precedes `created_at`.
  pub fn duration_minutes(&self) -> i64 {
    (self.resolved_at - self.created_at).num_minutes()
  }

  /// Creation day as written in the record's own offset.
  pub fn day_key(&self) -> String {
    self.created_at.format("%Y-%m-%d").to_string()
  }
}
