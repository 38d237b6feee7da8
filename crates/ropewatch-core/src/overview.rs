//! Rope overview — the read model shown when a rope's tag is scanned.
//!
//! [`assess`] wires the event-log provider to the status engine: it resolves
//! the rope, reads the latest inspection, reads the falls since the base date
//! and evaluates. Nothing here is stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  engine::{self, LatestInspection},
  event::Verdict,
  rope::{Rope, RopeId},
  status::{Status, StatusColor},
  store::RopeStore,
};

/// A rope together with its status as of a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RopeOverview {
  pub rope:         Rope,
  pub status:       Status,
  pub status_color: StatusColor,
  /// The day the status was evaluated for.
  pub as_of:        NaiveDate,
  pub base_date:    NaiveDate,
  /// When the interval rule fires; absent for retired ropes.
  pub next_due:     Option<NaiveDate>,
}

/// Failure to produce a [`RopeOverview`].
#[derive(Debug, Error)]
pub enum AssessError<E: std::error::Error + 'static> {
  #[error("rope not found: {0}")]
  RopeNotFound(RopeId),

  #[error(transparent)]
  Status(#[from] crate::Error),

  #[error("store error: {0}")]
  Store(#[source] E),
}

/// Evaluate the current status of `rope_id` as of `today`.
pub async fn assess<S: RopeStore>(
  store: &S,
  rope_id: &RopeId,
  today: NaiveDate,
) -> Result<RopeOverview, AssessError<S::Error>> {
  let rope = store
    .get_rope(rope_id)
    .await
    .map_err(AssessError::Store)?
    .ok_or_else(|| AssessError::RopeNotFound(rope_id.clone()))?;

  let latest = store
    .latest_inspection(rope_id)
    .await
    .map_err(AssessError::Store)?
    .as_ref()
    .map(LatestInspection::from);

  let base_date = engine::base_date(rope.purchase_date, latest.as_ref())?;

  // A failed inspection settles the status; the fall history is irrelevant.
  let falls = match latest {
    Some(LatestInspection { verdict: Verdict::Fail, .. }) => Vec::new(),
    _ => store
      .falls_on_or_after(rope_id, base_date)
      .await
      .map_err(AssessError::Store)?,
  };

  let status = engine::evaluate(
    today,
    rope.purchase_date,
    latest,
    falls.iter().map(|f| f.fall_type),
  )?;

  let next_due = match status {
    Status::Retired => None,
    Status::Active | Status::InspectionDue => Some(engine::next_due(base_date)?),
  };

  Ok(RopeOverview {
    rope,
    status,
    status_color: status.color(),
    as_of: today,
    base_date,
    next_due,
  })
}
