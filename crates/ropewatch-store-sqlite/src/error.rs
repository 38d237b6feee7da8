//! Error type for `ropewatch-store-sqlite`.

use ropewatch_core::rope::RopeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] ropewatch_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Attempted to record an event against a rope that does not exist.
  #[error("rope not found: {0}")]
  RopeNotFound(RopeId),

  #[error("no unused rope id found after {0} attempts")]
  RopeIdExhausted(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
