//! Derived rope status and its display colour.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

// ─── Status ──────────────────────────────────────────────────────────────────

/// The lifecycle state of a rope, derived on every query and never stored.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
  /// Safe to use.
  #[strum(to_string = "ACTIVE")]
  Active,
  /// Must be inspected before further use.
  #[strum(to_string = "INSPECTION DUE")]
  InspectionDue,
  /// Failed an inspection; permanently out of service until a passing
  /// inspection is recorded.
  #[strum(to_string = "RETIRED")]
  Retired,
}

impl Status {
  /// The colour a presentation layer shows for this status.
  ///
  /// Deliberately a wildcard-free `match`: a new status does not compile
  /// until it has a colour.
  pub fn color(self) -> StatusColor {
    match self {
      Self::Active => StatusColor::Green,
      Self::InspectionDue => StatusColor::Orange,
      Self::Retired => StatusColor::Red,
    }
  }
}

// ─── Colour ──────────────────────────────────────────────────────────────────

/// Display attribute attached to a [`Status`]. Rendered as a CSS colour name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusColor {
  Green,
  Orange,
  Red,
}
