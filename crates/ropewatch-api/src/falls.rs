//! Handlers for fall endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ropes/{id}/falls` | History, oldest first; 404 if rope unknown |
//! | `POST` | `/ropes/{id}/falls/new` | Body: `{"fall_date":"2024-03-01","recorded_by":"Ana","fall_type":"minor"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use ropewatch_core::{
  event::{FallRecord, FallType, NewFall, ensure_not_future},
  store::RopeStore,
};
use serde::Deserialize;

use crate::{ApiJson, ApiState, error::ApiError, non_empty, require_rope, required};

/// `GET /ropes/{id}/falls`
pub async fn list<S: RopeStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<FallRecord>>, ApiError> {
  let rope = require_rope(state.store.as_ref(), &id).await?;
  let records = state
    .store
    .list_falls(&rope.rope_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub fall_date:   NaiveDate,
  /// `HH:MM` or `HH:MM:SS`; blank means unknown.
  pub fall_time:   Option<String>,
  pub recorded_by: String,
  /// `major` or `minor`.
  pub fall_type:   String,
  pub comment:     Option<String>,
  pub image_url:   Option<String>,
}

/// `POST /ropes/{id}/falls/new`
pub async fn create<S: RopeStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let fall_type = FallType::parse(&body.fall_type)?;
  ensure_not_future("fall", body.fall_date, (state.today)())?;
  let recorded_by = required("recorded_by", body.recorded_by)?;
  let fall_time = non_empty(body.fall_time)
    .map(|t| parse_time(&t))
    .transpose()?;

  let rope = require_rope(state.store.as_ref(), &id).await?;
  let input = NewFall {
    rope_id: rope.rope_id,
    fall_date: body.fall_date,
    fall_time,
    recorded_by,
    fall_type,
    comment: non_empty(body.comment),
    image_url: non_empty(body.image_url),
  };

  let record = state.store.record_fall(input).await.map_err(ApiError::store)?;
  tracing::info!(
    rope_id = %record.rope_id,
    date = %record.fall_date,
    fall_type = <&'static str>::from(record.fall_type),
    "fall recorded"
  );
  Ok((StatusCode::CREATED, Json(record)))
}

fn parse_time(s: &str) -> Result<NaiveTime, ApiError> {
  NaiveTime::parse_from_str(s, "%H:%M:%S")
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|_| ApiError::BadRequest(format!("invalid fall time: {s:?}")))
}
