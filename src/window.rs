// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Calendar-quarter defaults and the date window incidents are filtered against
// role: windowing
// inputs: Reference date (usually "now"); explicit --from/--to dates
// outputs: DateWindow with inclusive calendar-day bounds and UTC instant bounds
// invariants:
// - quarter_start(d) <= d <= quarter_end(d), all inside the same quarter
// - quarter_end is the day before the next quarter's first day (Q4 rolls into next year, then steps back)
// - Both quarter functions are total; the last representable quarter ends at NaiveDate::MAX
// - contains() is strict-after start midnight and strictly before (end + 1 day) midnight, both UTC
// errors: InvalidWindow when start > end; parse_day surfaces chrono's message with the offending input
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, ReportResult};

/// First month (1-based) of the quarter containing `month`.
fn quarter_start_month(month: u32) -> u32 {
  ((month - 1) / 3) * 3 + 1
}

/// First day of the calendar quarter containing `d`.
pub fn quarter_start(d: NaiveDate) -> NaiveDate {
  // Day 1 of any month in a representable year exists; MIN is itself a Jan 1st.
  NaiveDate::from_ymd_opt(d.year(), quarter_start_month(d.month()), 1).unwrap_or(NaiveDate::MIN)
}

/// Last day of the calendar quarter containing `d`.
///
/// In the last representable year the next quarter cannot be built, so
/// Q4 saturates to `NaiveDate::MAX` (which is that year's Dec 31).
pub fn quarter_end(d: NaiveDate) -> NaiveDate {
  let start_month = quarter_start_month(d.month());
  let (next_y, next_m) = if start_month == 10 {
    (d.year() + 1, 1)
  } else {
    (d.year(), start_month + 3)
  };

  NaiveDate::from_ymd_opt(next_y, next_m, 1)
    .and_then(|first_next| first_next.pred_opt())
    .unwrap_or(NaiveDate::MAX)
}

/// Parse a `YYYY-MM-DD` calendar day.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").with_context(|| format!("invalid date {raw:?}, expected YYYY-MM-DD"))
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateWindow {
  pub fn new(start: NaiveDate, end: NaiveDate) -> ReportResult<Self> {
    if start > end {
      return Err(ReportError::InvalidWindow {
        start: start.to_string(),
        end: end.to_string(),
      });
    }

    Ok(Self { start, end })
  }

  /// The quarter containing `today`.
  pub fn current_quarter(today: NaiveDate) -> Self {
    Self {
      start: quarter_start(today),
      end: quarter_end(today),
    }
  }

  /// Lower bound instant (exclusive): `start` at midnight UTC.
  pub fn lower_bound(&self) -> DateTime<Utc> {
    Utc.from_utc_datetime(&self.start.and_time(NaiveTime::MIN))
  }

  /// Upper bound instant (exclusive): the day after `end` at midnight UTC.
  pub fn upper_bound(&self) -> DateTime<Utc> {
    let after_end = self.end.succ_opt().unwrap_or(self.end);
    Utc.from_utc_datetime(&after_end.and_time(NaiveTime::MIN))
  }

  /// Whether an incident created at `instant` belongs to this window.
  ///
  /// The start bound is exclusive, so an incident stamped exactly at
  /// `start` midnight is dropped; anything during the `end` day is kept.
  pub fn contains<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
    let at = instant.with_timezone(&Utc);
    at > self.lower_bound() && at < self.upper_bound()
  }

  /// Every calendar day in the window, in order.
  pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
    let end = self.end;
    self.start.iter_days().take_while(move |d| *d <= end)
  }
}
