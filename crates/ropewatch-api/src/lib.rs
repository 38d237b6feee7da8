//! JSON REST API for ropewatch.
//!
//! Exposes axum [`Router`]s backed by any [`RopeStore`]. Reads are split from
//! writes so the caller can put an auth layer in front of the write router
//! only. Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = ApiState::new(store);
//! .nest("/api", read_router(state.clone()).merge(write_router(state).route_layer(auth)))
//! ```

pub mod error;
pub mod falls;
pub mod inspections;
pub mod ropes;

use std::sync::Arc;

use axum::{
  Json, Router,
  extract::FromRequest,
  routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use ropewatch_core::{
  rope::{Rope, RopeId},
  store::RopeStore,
};

pub use error::ApiError;

// ─── State ───────────────────────────────────────────────────────────────────

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:      Arc<S>,
  /// Source of "today" for status evaluation and date validation.
  pub today:      fn() -> NaiveDate,
  /// Absolute URL this API is reachable at, without a trailing slash.
  /// Prefixes the tag URL handed back when a rope is registered.
  pub public_url: Arc<str>,
}

impl<S> ApiState<S> {
  /// State using the UTC calendar date as "today" and relative tag URLs.
  pub fn new(store: Arc<S>) -> Self {
    Self { store, today: utc_today, public_url: Arc::from("") }
  }

  pub fn with_public_url(mut self, url: &str) -> Self {
    self.public_url = Arc::from(url.trim_end_matches('/'));
    self
  }

  /// The URL written to a rope's NFC tag: its public overview route.
  pub fn tag_url(&self, id: &RopeId) -> String {
    format!("{}/ropes/{id}", self.public_url)
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:      Arc::clone(&self.store),
      today:      self.today,
      public_url: Arc::clone(&self.public_url),
    }
  }
}

pub fn utc_today() -> NaiveDate { Utc::now().date_naive() }

// ─── Routers ─────────────────────────────────────────────────────────────────

/// Public, read-only routes: what anyone scanning a rope's tag may see.
pub fn read_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RopeStore + 'static,
{
  Router::new()
    .route("/ropes/{id}", get(ropes::overview::<S>))
    .route("/ropes/{id}/inspections", get(inspections::list::<S>))
    .route("/ropes/{id}/falls", get(falls::list::<S>))
    .with_state(state)
}

/// Routes that append to the event log or administer ropes.
pub fn write_router<S>(state: ApiState<S>) -> Router<()>
where
  S: RopeStore + 'static,
{
  Router::new()
    .route("/admin/ropes", get(ropes::list::<S>).post(ropes::create::<S>))
    .route("/ropes/{id}/inspections/new", post(inspections::create::<S>))
    .route("/ropes/{id}/falls/new", post(falls::create::<S>))
    .with_state(state)
}

// ─── Shared handler helpers ──────────────────────────────────────────────────

/// `Json` body extractor whose rejections render as [`ApiError::BadRequest`].
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Resolve the rope named in the path, or 404.
pub(crate) async fn require_rope<S: RopeStore>(
  store: &S,
  raw_id: &str,
) -> Result<Rope, ApiError> {
  let id = RopeId::parse(raw_id)?;
  store
    .get_rope(&id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("rope {id} not found")))
}

/// Treat blank form fields as absent.
pub(crate) fn non_empty(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// A mandatory free-text field; blank is rejected.
pub(crate) fn required(field: &str, s: String) -> Result<String, ApiError> {
  non_empty(Some(s)).ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use ropewatch_core::rope::NewRope;
  use ropewatch_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn fixed_today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 3, 15).unwrap() }

  async fn make_state() -> ApiState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let mut state =
      ApiState::new(Arc::new(store)).with_public_url("https://ropes.example.org/api/");
    state.today = fixed_today;
    state
  }

  fn app(state: ApiState<SqliteStore>) -> Router {
    read_router(state.clone()).merge(write_router(state))
  }

  async fn send(
    state: &ApiState<SqliteStore>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = app(state.clone())
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
  }

  async fn create_rope(state: &ApiState<SqliteStore>, purchase_date: &str) -> String {
    let (status, body) = send(
      state,
      "POST",
      "/admin/ropes",
      Some(json!({
        "product_name":       "Dynamic 9.8",
        "thickness":          "9.8mm",
        "original_length":    "60m",
        "color":              "blue",
        "batch":              "B-17",
        "manufacturing_date": "2023-11-20",
        "purchase_date":      purchase_date,
        "customer_password":  "hunter2",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["rope_id"].as_str().unwrap().to_owned()
  }

  // ── Ropes ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn created_rope_is_active() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-03-05").await;
    assert_eq!(id.len(), 10);

    let (status, body) = send(&state, "GET", &format!("/ropes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["status_color"], "green");
    assert_eq!(body["rope"]["product_name"], "Dynamic 9.8");
    assert_eq!(body["as_of"], "2024-03-15");
    assert!(body["rope"].get("customer_password_hash").is_none());
  }

  #[tokio::test]
  async fn registration_returns_tag_url() {
    let state = make_state().await;
    let (status, body) = send(
      &state,
      "POST",
      "/admin/ropes",
      Some(json!({ "product_name": "Dynamic 9.8", "purchase_date": "2024-03-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["rope_id"].as_str().unwrap();
    assert_eq!(
      body["tag_url"].as_str().unwrap(),
      format!("https://ropes.example.org/api/ropes/{id}")
    );
  }

  #[tokio::test]
  async fn rope_without_base_date_is_unprocessable() {
    let state = make_state().await;
    let rope = state
      .store
      .create_rope(NewRope {
        product_name:           "Legacy".into(),
        thickness:              String::new(),
        original_length:        String::new(),
        color:                  String::new(),
        batch:                  String::new(),
        manufacturing_date:     None,
        purchase_date:          None,
        customer_password_hash: None,
      })
      .await
      .unwrap();

    let (status, body) = send(&state, "GET", &format!("/ropes/{}", rope.rope_id), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("base date"), "{body}");
    assert!(body.get("status").is_none());
  }

  #[tokio::test]
  async fn malformed_body_is_a_json_bad_request() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, body) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/falls/new"),
      Some(json!({ "fall_date": "2024-13-01", "recorded_by": "Ana", "fall_type": "minor" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("fall_date"), "{body}");
  }

  #[tokio::test]
  async fn missing_field_is_a_json_bad_request() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, body) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/inspections/new"),
      Some(json!({ "inspected_by": "Kim", "verdict": "pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
  }

  #[tokio::test]
  async fn unknown_rope_returns_404() {
    let state = make_state().await;
    let (status, body) = send(&state, "GET", "/ropes/NOSUCHROPE", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("NOSUCHROPE"));
  }

  #[tokio::test]
  async fn admin_lists_ropes() {
    let state = make_state().await;
    create_rope(&state, "2024-01-01").await;
    create_rope(&state, "2024-02-01").await;
    let (status, body) = send(&state, "GET", "/admin/ropes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
  }

  // ── Falls ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn three_minor_falls_make_inspection_due() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;

    for day in ["2024-01-10", "2024-02-01", "2024-03-01"] {
      let (status, _) = send(
        &state,
        "POST",
        &format!("/ropes/{id}/falls/new"),
        Some(json!({
          "fall_date":   day,
          "fall_time":   "14:05",
          "recorded_by": "Ana",
          "fall_type":   "minor",
          "comment":     "",
        })),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = send(&state, "GET", &format!("/ropes/{id}"), None).await;
    assert_eq!(body["status"], "INSPECTION_DUE");
    assert_eq!(body["status_color"], "orange");

    let (status, falls) = send(&state, "GET", &format!("/ropes/{id}/falls"), None).await;
    assert_eq!(status, StatusCode::OK);
    let falls = falls.as_array().unwrap();
    assert_eq!(falls.len(), 3);
    assert_eq!(falls[0]["fall_date"], "2024-01-10");
    assert_eq!(falls[0]["fall_time"], "14:05:00");
    assert!(falls[0]["comment"].is_null());
  }

  #[tokio::test]
  async fn unknown_fall_type_is_rejected() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, body) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/falls/new"),
      Some(json!({ "fall_date": "2024-03-01", "recorded_by": "Ana", "fall_type": "medium" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("medium"));
  }

  #[tokio::test]
  async fn future_fall_is_rejected() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, body) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/falls/new"),
      Some(json!({ "fall_date": "2024-03-16", "recorded_by": "Ana", "fall_type": "major" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("future"));
  }

  #[tokio::test]
  async fn fall_for_unknown_rope_returns_404() {
    let state = make_state().await;
    let (status, _) = send(
      &state,
      "POST",
      "/ropes/NOSUCHROPE/falls/new",
      Some(json!({ "fall_date": "2024-03-01", "recorded_by": "Ana", "fall_type": "major" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Inspections ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn failed_inspection_retires_rope() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;

    let (status, record) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/inspections/new"),
      Some(json!({
        "inspection_date": "2024-03-10",
        "inspected_by":    "Kim",
        "verdict":         "fail",
        "comment":         "core shot",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["verdict"], "fail");

    let (_, body) = send(&state, "GET", &format!("/ropes/{id}"), None).await;
    assert_eq!(body["status"], "RETIRED");
    assert_eq!(body["status_color"], "red");
    assert!(body["next_due"].is_null());

    let (_, list) = send(&state, "GET", &format!("/ropes/{id}/inspections"), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["comment"], "core shot");
  }

  #[tokio::test]
  async fn unknown_verdict_is_rejected() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, _) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/inspections/new"),
      Some(json!({ "inspection_date": "2024-03-10", "inspected_by": "Kim", "verdict": "meh" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn inspector_name_is_required() {
    let state = make_state().await;
    let id = create_rope(&state, "2024-01-01").await;
    let (status, body) = send(
      &state,
      "POST",
      &format!("/ropes/{id}/inspections/new"),
      Some(json!({ "inspection_date": "2024-03-10", "inspected_by": "  ", "verdict": "pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("inspected_by"));
  }

  #[tokio::test]
  async fn inspections_of_unknown_rope_return_404() {
    let state = make_state().await;
    let (status, _) = send(&state, "GET", "/ropes/NOSUCHROPE/inspections", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
