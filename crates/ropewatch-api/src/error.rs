//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use ropewatch_core::overview::AssessError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The status engine refused the rope's history. Never rendered as a
  /// status value.
  #[error("cannot determine status: {0}")]
  Status(#[source] ropewatch_core::Error),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }
}

impl From<ropewatch_core::Error> for ApiError {
  fn from(e: ropewatch_core::Error) -> Self {
    use ropewatch_core::Error as E;
    match e {
      E::InvalidFallType(_)
      | E::InvalidVerdict(_)
      | E::InvalidRopeId(_)
      | E::FutureDate { .. } => ApiError::BadRequest(e.to_string()),
      E::MissingBaseDate | E::DateOutOfRange(..) => ApiError::Status(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl<E> From<AssessError<E>> for ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  fn from(e: AssessError<E>) -> Self {
    match e {
      AssessError::RopeNotFound(id) => ApiError::NotFound(format!("rope {id} not found")),
      AssessError::Status(e) => ApiError::Status(e),
      AssessError::Store(e) => ApiError::store(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Status(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
      ApiError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    (status, Json(json!({ "error": message }))).into_response()
  }
}
