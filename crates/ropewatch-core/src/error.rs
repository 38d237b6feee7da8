//! Error types for `ropewatch-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("invalid fall type: {0:?} (expected \"major\" or \"minor\")")]
  InvalidFallType(String),

  #[error("invalid verdict: {0:?} (expected \"pass\" or \"fail\")")]
  InvalidVerdict(String),

  #[error("cannot establish a base date: no inspection and no purchase date")]
  MissingBaseDate,

  #[error("invalid rope id: {0:?}")]
  InvalidRopeId(String),

  #[error("{what} date cannot be in the future: {date}")]
  FutureDate {
    what: &'static str,
    date: NaiveDate,
  },

  #[error("date out of range: {0} + {1} days")]
  DateOutOfRange(NaiveDate, u64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
