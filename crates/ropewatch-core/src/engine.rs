//! The status engine: a pure function from a rope's event history to its
//! current [`Status`].
//!
//! Rules, first match wins:
//!
//! 1. The latest inspection failed → [`Status::Retired`]. Falls and elapsed
//!    time are not consulted. Only a newer non-failing inspection lifts it.
//! 2. Falls since the base date reach [`MAJOR_FALL_LIMIT`] major falls or
//!    [`MINOR_FALL_LIMIT`] minor falls → [`Status::InspectionDue`].
//! 3. `today` is on or after base date + [`REINSPECTION_INTERVAL_DAYS`] →
//!    [`Status::InspectionDue`].
//! 4. Otherwise → [`Status::Active`].
//!
//! The base date is the latest inspection's date, or the purchase date when
//! the rope has never been inspected. Falls on the base date itself count.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  event::{FallType, InspectionRecord, Verdict},
  policy::{MAJOR_FALL_LIMIT, MINOR_FALL_LIMIT, REINSPECTION_INTERVAL_DAYS},
  status::Status,
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// The parts of the latest inspection the engine looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestInspection {
  pub date:    NaiveDate,
  pub verdict: Verdict,
}

impl From<&InspectionRecord> for LatestInspection {
  fn from(record: &InspectionRecord) -> Self {
    Self { date: record.inspection_date, verdict: record.verdict }
  }
}

/// Fall counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallCounts {
  pub major: usize,
  pub minor: usize,
}

impl FallCounts {
  pub fn tally(falls: impl IntoIterator<Item = FallType>) -> Self {
    falls.into_iter().collect()
  }

  /// Whether these falls alone make an inspection due.
  pub fn exceeds_limits(&self) -> bool {
    self.major >= MAJOR_FALL_LIMIT || self.minor >= MINOR_FALL_LIMIT
  }
}

impl FromIterator<FallType> for FallCounts {
  fn from_iter<I: IntoIterator<Item = FallType>>(iter: I) -> Self {
    let mut counts = Self::default();
    for fall in iter {
      match fall {
        FallType::Major => counts.major += 1,
        FallType::Minor => counts.minor += 1,
      }
    }
    counts
  }
}

// ─── Dates ───────────────────────────────────────────────────────────────────

/// The date falls are counted from and the re-inspection clock runs from.
pub fn base_date(
  purchase_date: Option<NaiveDate>,
  latest: Option<&LatestInspection>,
) -> Result<NaiveDate> {
  latest
    .map(|i| i.date)
    .or(purchase_date)
    .ok_or(Error::MissingBaseDate)
}

/// The date on which an inspection falls due by elapsed time alone.
pub fn next_due(base: NaiveDate) -> Result<NaiveDate> {
  base
    .checked_add_days(Days::new(REINSPECTION_INTERVAL_DAYS))
    .ok_or(Error::DateOutOfRange(base, REINSPECTION_INTERVAL_DAYS))
}

// ─── Evaluation ──────────────────────────────────────────────────────────────

/// Derive the status of a rope as of `today`.
///
/// `falls_since_base` must hold the type of every fall dated on or after the
/// base date (see [`base_date`]); order is irrelevant.
pub fn evaluate(
  today: NaiveDate,
  purchase_date: Option<NaiveDate>,
  latest: Option<LatestInspection>,
  falls_since_base: impl IntoIterator<Item = FallType>,
) -> Result<Status> {
  if let Some(LatestInspection { verdict: Verdict::Fail, .. }) = latest {
    return Ok(Status::Retired);
  }

  let base = base_date(purchase_date, latest.as_ref())?;

  if FallCounts::tally(falls_since_base).exceeds_limits() {
    return Ok(Status::InspectionDue);
  }

  if today >= next_due(base)? {
    return Ok(Status::InspectionDue);
  }

  Ok(Status::Active)
}
