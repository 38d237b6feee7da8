//! Handlers for rope endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/ropes/{id}` | Rope with its current status; 404 if not found |
//! | `GET`  | `/admin/ropes` | All ropes, oldest first |
//! | `POST` | `/admin/ropes` | Registers a rope; 201 with the stored rope and its `tag_url` |

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rand_core::OsRng;
use ropewatch_core::{
  event::ensure_not_future,
  overview::{RopeOverview, assess},
  rope::{NewRope, Rope, RopeId},
  store::RopeStore,
};
use serde::{Deserialize, Serialize};

use crate::{ApiJson, ApiState, error::ApiError, non_empty, required};

// ─── Overview ────────────────────────────────────────────────────────────────

/// `GET /ropes/{id}`
pub async fn overview<S: RopeStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> Result<Json<RopeOverview>, ApiError> {
  let id = RopeId::parse(&id)?;
  let view = assess(state.store.as_ref(), &id, (state.today)()).await?;
  Ok(Json(view))
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /admin/ropes`
pub async fn list<S: RopeStore>(
  State(state): State<ApiState<S>>,
) -> Result<Json<Vec<Rope>>, ApiError> {
  let ropes = state.store.list_ropes().await.map_err(ApiError::store)?;
  Ok(Json(ropes))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub product_name:       String,
  #[serde(default)]
  pub thickness:          String,
  #[serde(default)]
  pub original_length:    String,
  #[serde(default)]
  pub color:              String,
  #[serde(default)]
  pub batch:              String,
  pub manufacturing_date: Option<NaiveDate>,
  pub purchase_date:      NaiveDate,
  /// Plaintext; hashed before it reaches the store.
  pub customer_password:  Option<String>,
}

/// Response to a registration: the stored rope plus the URL to write to
/// its NFC tag.
#[derive(Debug, Serialize)]
pub struct CreatedRope {
  #[serde(flatten)]
  pub rope:    Rope,
  pub tag_url: String,
}

/// `POST /admin/ropes`
pub async fn create<S: RopeStore>(
  State(state): State<ApiState<S>>,
  ApiJson(body): ApiJson<CreateBody>,
) -> Result<impl IntoResponse, ApiError> {
  let today = (state.today)();
  ensure_not_future("purchase", body.purchase_date, today)?;
  if let Some(made) = body.manufacturing_date {
    ensure_not_future("manufacturing", made, today)?;
  }

  let product_name = required("product_name", body.product_name)?;
  let customer_password_hash = match non_empty(body.customer_password) {
    Some(pw) => Some(
      tokio::task::spawn_blocking(move || hash_password(&pw))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??,
    ),
    None => None,
  };

  let input = NewRope {
    product_name,
    thickness: body.thickness.trim().to_owned(),
    original_length: body.original_length.trim().to_owned(),
    color: body.color.trim().to_owned(),
    batch: body.batch.trim().to_owned(),
    manufacturing_date: body.manufacturing_date,
    purchase_date: Some(body.purchase_date),
    customer_password_hash,
  };

  let rope = state.store.create_rope(input).await.map_err(ApiError::store)?;
  tracing::info!(rope_id = %rope.rope_id, product = %rope.product_name, "rope registered");
  let tag_url = state.tag_url(&rope.rope_id);
  Ok((StatusCode::CREATED, Json(CreatedRope { rope, tag_url })))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}
