//! Handlers for inspection endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ropes/{id}/inspections` | History, oldest first; 404 if rope unknown |
//! | `POST` | `/ropes/{id}/inspections/new` | Body: `{"inspection_date":"2024-03-10","inspected_by":"Kim","verdict":"pass"}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use ropewatch_core::{
  event::{InspectionRecord, NewInspection, Verdict, ensure_not_future},
  store::RopeStore,
};
use serde::Deserialize;

use crate::{ApiJson, ApiState, error::ApiError, non_empty, require_rope, required};

/// `GET /ropes/{id}/inspections`
pub async fn list<S: RopeStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<Vec<InspectionRecord>>, ApiError> {
  let rope = require_rope(state.store.as_ref(), &id).await?;
  let records = state
    .store
    .list_inspections(&rope.rope_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub inspection_date: NaiveDate,
  pub inspected_by:    String,
  /// `pass` or `fail`; parsed here so a bad value yields a descriptive 400.
  pub verdict:         String,
  pub comment:         Option<String>,
  pub image_url:       Option<String>,
}

/// `POST /ropes/{id}/inspections/new`
pub async fn create<S: RopeStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let verdict = Verdict::parse(&body.verdict)?;
  ensure_not_future("inspection", body.inspection_date, (state.today)())?;
  let inspected_by = required("inspected_by", body.inspected_by)?;

  let rope = require_rope(state.store.as_ref(), &id).await?;
  let input = NewInspection {
    rope_id: rope.rope_id,
    inspection_date: body.inspection_date,
    inspected_by,
    verdict,
    comment: non_empty(body.comment),
    image_url: non_empty(body.image_url),
  };

  let record = state
    .store
    .record_inspection(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(
    rope_id = %record.rope_id,
    date = %record.inspection_date,
    verdict = <&'static str>::from(record.verdict),
    "inspection recorded"
  );
  Ok((StatusCode::CREATED, Json(record)))
}
