//! The `RopeStore` trait: the event-log provider the status engine reads.
//!
//! The trait is implemented by storage backends (e.g. `ropewatch-store-sqlite`).
//! Higher layers (`ropewatch-api`, `ropewatch-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;

use crate::{
  event::{FallRecord, InspectionRecord, NewFall, NewInspection},
  rope::{NewRope, Rope, RopeId},
};

/// Abstraction over a ropewatch storage backend.
///
/// Ropes are immutable after creation and both event histories are
/// append-only: no method updates or deletes a record. Each write must be
/// atomic, so a concurrent read never sees half an event.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RopeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ropes ─────────────────────────────────────────────────────────────

  /// Persist a new rope under a freshly generated [`RopeId`].
  fn create_rope(
    &self,
    input: NewRope,
  ) -> impl Future<Output = Result<Rope, Self::Error>> + Send + '_;

  /// Retrieve a rope by id. Returns `None` if not found.
  fn get_rope<'a>(
    &'a self,
    id: &'a RopeId,
  ) -> impl Future<Output = Result<Option<Rope>, Self::Error>> + Send + 'a;

  /// All ropes, oldest first.
  fn list_ropes(
    &self,
  ) -> impl Future<Output = Result<Vec<Rope>, Self::Error>> + Send + '_;

  // ── Events — append-only writes ───────────────────────────────────────

  /// Append an inspection. Fails if the rope does not exist.
  fn record_inspection(
    &self,
    input: NewInspection,
  ) -> impl Future<Output = Result<InspectionRecord, Self::Error>> + Send + '_;

  /// Append a fall. Fails if the rope does not exist.
  fn record_fall(
    &self,
    input: NewFall,
  ) -> impl Future<Output = Result<FallRecord, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Full inspection history, oldest first.
  fn list_inspections<'a>(
    &'a self,
    rope_id: &'a RopeId,
  ) -> impl Future<Output = Result<Vec<InspectionRecord>, Self::Error>> + Send + 'a;

  /// Full fall history, oldest first.
  fn list_falls<'a>(
    &'a self,
    rope_id: &'a RopeId,
  ) -> impl Future<Output = Result<Vec<FallRecord>, Self::Error>> + Send + 'a;

  /// The inspection with the greatest `inspection_date`. Among inspections
  /// sharing that date, the one recorded last (highest `seq`) wins.
  fn latest_inspection<'a>(
    &'a self,
    rope_id: &'a RopeId,
  ) -> impl Future<Output = Result<Option<InspectionRecord>, Self::Error>> + Send + 'a;

  /// Every fall with `fall_date >= since`, in no particular order.
  fn falls_on_or_after<'a>(
    &'a self,
    rope_id: &'a RopeId,
    since: NaiveDate,
  ) -> impl Future<Output = Result<Vec<FallRecord>, Self::Error>> + Send + 'a;
}
