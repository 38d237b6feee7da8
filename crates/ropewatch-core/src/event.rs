//! Inspection and fall events — the append-only history of a rope.
//!
//! Events are immutable once recorded. A rope's status is never stored; it is
//! recomputed from these records on every query.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result, rope::RopeId};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Outcome of an inspection.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verdict {
  Pass,
  Fail,
}

impl Verdict {
  /// Parse the text submitted at the data-entry boundary or read back from
  /// storage. Anything other than `pass`/`fail` is rejected.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::InvalidVerdict(s.to_owned()))
  }
}

/// Severity of a fall.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FallType {
  Major,
  Minor,
}

impl FallType {
  /// Parse the text submitted at the data-entry boundary or read back from
  /// storage. Anything other than `major`/`minor` is rejected.
  pub fn parse(s: &str) -> Result<Self> {
    s.trim()
      .parse()
      .map_err(|_| Error::InvalidFallType(s.to_owned()))
  }
}

// ─── Inspections ─────────────────────────────────────────────────────────────

/// A recorded inspection of a rope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionRecord {
  pub inspection_id:   Uuid,
  pub rope_id:         RopeId,
  pub inspection_date: NaiveDate,
  pub inspected_by:    String,
  pub verdict:         Verdict,
  pub comment:         Option<String>,
  /// Reference to photographic evidence held elsewhere.
  pub image_url:       Option<String>,
  pub recorded_at:     DateTime<Utc>,
  /// Store-assigned insertion sequence; breaks ties between inspections
  /// sharing a date.
  pub seq:             i64,
}

/// Input to [`crate::store::RopeStore::record_inspection`].
#[derive(Debug, Clone)]
pub struct NewInspection {
  pub rope_id:         RopeId,
  pub inspection_date: NaiveDate,
  pub inspected_by:    String,
  pub verdict:         Verdict,
  pub comment:         Option<String>,
  pub image_url:       Option<String>,
}

impl NewInspection {
  /// Convenience constructor with the optional fields left empty.
  pub fn new(
    rope_id: RopeId,
    inspection_date: NaiveDate,
    inspected_by: impl Into<String>,
    verdict: Verdict,
  ) -> Self {
    Self {
      rope_id,
      inspection_date,
      inspected_by: inspected_by.into(),
      verdict,
      comment: None,
      image_url: None,
    }
  }
}

// ─── Falls ───────────────────────────────────────────────────────────────────

/// A recorded fall arrested by a rope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallRecord {
  pub fall_id:     Uuid,
  pub rope_id:     RopeId,
  pub fall_date:   NaiveDate,
  pub fall_time:   Option<NaiveTime>,
  pub recorded_by: String,
  pub fall_type:   FallType,
  pub comment:     Option<String>,
  pub image_url:   Option<String>,
  pub recorded_at: DateTime<Utc>,
  pub seq:         i64,
}

/// Input to [`crate::store::RopeStore::record_fall`].
#[derive(Debug, Clone)]
pub struct NewFall {
  pub rope_id:     RopeId,
  pub fall_date:   NaiveDate,
  pub fall_time:   Option<NaiveTime>,
  pub recorded_by: String,
  pub fall_type:   FallType,
  pub comment:     Option<String>,
  pub image_url:   Option<String>,
}

impl NewFall {
  /// Convenience constructor with the optional fields left empty.
  pub fn new(
    rope_id: RopeId,
    fall_date: NaiveDate,
    recorded_by: impl Into<String>,
    fall_type: FallType,
  ) -> Self {
    Self {
      rope_id,
      fall_date,
      fall_time: None,
      recorded_by: recorded_by.into(),
      fall_type,
      comment: None,
      image_url: None,
    }
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Reject an event dated after `today`. `what` names the field in the error
/// message (e.g. `"inspection"`).
pub fn ensure_not_future(
  what: &'static str,
  date: NaiveDate,
  today: NaiveDate,
) -> Result<()> {
  if date > today {
    return Err(Error::FutureDate { what, date });
  }
  Ok(())
}
