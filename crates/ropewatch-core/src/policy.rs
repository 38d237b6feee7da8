//! Fixed safety thresholds applied by the status engine.
//!
//! Every threshold the engine checks lives here. Tightening or relaxing one
//! is a change to the constant alone; [`crate::engine::evaluate`] never
//! inlines a number.

/// Major falls since the base date that force a re-inspection.
pub const MAJOR_FALL_LIMIT: usize = 1;

/// Minor falls since the base date that force a re-inspection.
pub const MINOR_FALL_LIMIT: usize = 3;

/// Days after the base date at which an inspection becomes due regardless
/// of falls.
pub const REINSPECTION_INTERVAL_DAYS: u64 = 180;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn major_falls_are_stricter_than_minor_falls() {
    assert!(MAJOR_FALL_LIMIT < MINOR_FALL_LIMIT);
  }

  #[test]
  fn thresholds_match_the_published_policy() {
    assert_eq!(MAJOR_FALL_LIMIT, 1);
    assert_eq!(MINOR_FALL_LIMIT, 3);
    assert_eq!(REINSPECTION_INTERVAL_DAYS, 180);
  }
}
