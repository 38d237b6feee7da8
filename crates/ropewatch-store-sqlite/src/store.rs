//! [`SqliteStore`] — the SQLite implementation of [`RopeStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use ropewatch_core::{
  event::{FallRecord, InspectionRecord, NewFall, NewInspection},
  rope::{NewRope, ROPE_ID_ALPHABET, ROPE_ID_LEN, Rope, RopeId},
  store::RopeStore,
};

use crate::{
  Error, Result,
  encode::{
    RawFall, RawInspection, RawRope, encode_date, encode_dt, encode_time,
    encode_uuid,
  },
  schema::SCHEMA,
};

/// Fresh ids tried before `create_rope` gives up.
const ROPE_ID_ATTEMPTS: usize = 5;

// ─── Id generation ───────────────────────────────────────────────────────────

/// Draw a random token from [`ROPE_ID_ALPHABET`] using the OS RNG.
fn generate_rope_id() -> Result<RopeId> {
  // Largest multiple of the alphabet size that fits in a byte; bytes at or
  // above it are rejected so every character is equally likely.
  let limit = (u8::MAX as usize + 1) / ROPE_ID_ALPHABET.len() * ROPE_ID_ALPHABET.len();

  let mut token = String::with_capacity(ROPE_ID_LEN);
  let mut buf = [0u8; 32];
  while token.len() < ROPE_ID_LEN {
    OsRng.fill_bytes(&mut buf);
    for &b in buf.iter().filter(|&&b| (b as usize) < limit) {
      if token.len() == ROPE_ID_LEN {
        break;
      }
      token.push(ROPE_ID_ALPHABET[b as usize % ROPE_ID_ALPHABET.len()] as char);
    }
  }
  Ok(RopeId::parse(&token)?)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A ropewatch event log backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn rope_exists(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM ropes WHERE rope_id = ?1",
        rusqlite::params![id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

// ─── RopeStore impl ──────────────────────────────────────────────────────────

impl RopeStore for SqliteStore {
  type Error = Error;

  // ── Ropes ─────────────────────────────────────────────────────────────────

  async fn create_rope(&self, input: NewRope) -> Result<Rope> {
    let created_at = Utc::now();

    for attempt in 1..=ROPE_ID_ATTEMPTS {
      let rope_id = generate_rope_id()?;

      let id_str       = rope_id.as_str().to_owned();
      let product_name = input.product_name.clone();
      let thickness    = input.thickness.clone();
      let length       = input.original_length.clone();
      let color        = input.color.clone();
      let batch        = input.batch.clone();
      let mfg_str      = input.manufacturing_date.map(encode_date);
      let purchase_str = input.purchase_date.map(encode_date);
      let hash         = input.customer_password_hash.clone();
      let at_str       = encode_dt(created_at);

      let inserted = self
        .conn
        .call(move |conn| {
          let n = conn.execute(
            "INSERT OR IGNORE INTO ropes (
               rope_id, product_name, thickness, original_length, color,
               batch, manufacturing_date, purchase_date,
               customer_password_hash, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              id_str,
              product_name,
              thickness,
              length,
              color,
              batch,
              mfg_str,
              purchase_str,
              hash,
              at_str,
            ],
          )?;
          Ok(n == 1)
        })
        .await?;

      if inserted {
        tracing::debug!(rope_id = %rope_id, "rope created");
        return Ok(Rope {
          rope_id,
          product_name: input.product_name,
          thickness: input.thickness,
          original_length: input.original_length,
          color: input.color,
          batch: input.batch,
          manufacturing_date: input.manufacturing_date,
          purchase_date: input.purchase_date,
          created_at,
        });
      }

      tracing::warn!(rope_id = %rope_id, attempt, "rope id collision, retrying");
    }

    Err(Error::RopeIdExhausted(ROPE_ID_ATTEMPTS))
  }

  async fn get_rope(&self, id: &RopeId) -> Result<Option<Rope>> {
    let id_str = id.as_str().to_owned();

    let raw: Option<RawRope> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {} FROM ropes WHERE rope_id = ?1", RawRope::COLUMNS),
              rusqlite::params![id_str],
              RawRope::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRope::into_rope).transpose()
  }

  async fn list_ropes(&self) -> Result<Vec<Rope>> {
    let raws: Vec<RawRope> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM ropes ORDER BY created_at ASC, rowid ASC",
          RawRope::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawRope::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRope::into_rope).collect()
  }

  // ── Events — append-only writes ───────────────────────────────────────────

  async fn record_inspection(&self, input: NewInspection) -> Result<InspectionRecord> {
    let inspection_id = Uuid::new_v4();
    let recorded_at   = Utc::now();

    let id_str      = encode_uuid(inspection_id);
    let rope_str    = input.rope_id.as_str().to_owned();
    let date_str    = encode_date(input.inspection_date);
    let by          = input.inspected_by.clone();
    let verdict_str: &'static str = input.verdict.into();
    let comment     = input.comment.clone();
    let image_url   = input.image_url.clone();
    let at_str      = encode_dt(recorded_at);

    // Existence check and insert run in one call on the connection thread,
    // so no other write can interleave.
    let seq: Option<i64> = self
      .conn
      .call(move |conn| {
        if !rope_exists(conn, &rope_str)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO inspection_logs (
             inspection_id, rope_id, inspection_date, inspected_by,
             verdict, comment, image_url, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            rope_str,
            date_str,
            by,
            verdict_str,
            comment,
            image_url,
            at_str,
          ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let seq = seq.ok_or_else(|| Error::RopeNotFound(input.rope_id.clone()))?;

    Ok(InspectionRecord {
      inspection_id,
      rope_id: input.rope_id,
      inspection_date: input.inspection_date,
      inspected_by: input.inspected_by,
      verdict: input.verdict,
      comment: input.comment,
      image_url: input.image_url,
      recorded_at,
      seq,
    })
  }

  async fn record_fall(&self, input: NewFall) -> Result<FallRecord> {
    let fall_id     = Uuid::new_v4();
    let recorded_at = Utc::now();

    let id_str    = encode_uuid(fall_id);
    let rope_str  = input.rope_id.as_str().to_owned();
    let date_str  = encode_date(input.fall_date);
    let time_str  = input.fall_time.map(encode_time);
    let by        = input.recorded_by.clone();
    let type_str: &'static str = input.fall_type.into();
    let comment   = input.comment.clone();
    let image_url = input.image_url.clone();
    let at_str    = encode_dt(recorded_at);

    let seq: Option<i64> = self
      .conn
      .call(move |conn| {
        if !rope_exists(conn, &rope_str)? {
          return Ok(None);
        }
        conn.execute(
          "INSERT INTO fall_logs (
             fall_id, rope_id, fall_date, fall_time, recorded_by,
             fall_type, comment, image_url, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str,
            rope_str,
            date_str,
            time_str,
            by,
            type_str,
            comment,
            image_url,
            at_str,
          ],
        )?;
        Ok(Some(conn.last_insert_rowid()))
      })
      .await?;

    let seq = seq.ok_or_else(|| Error::RopeNotFound(input.rope_id.clone()))?;

    Ok(FallRecord {
      fall_id,
      rope_id: input.rope_id,
      fall_date: input.fall_date,
      fall_time: input.fall_time,
      recorded_by: input.recorded_by,
      fall_type: input.fall_type,
      comment: input.comment,
      image_url: input.image_url,
      recorded_at,
      seq,
    })
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_inspections(&self, rope_id: &RopeId) -> Result<Vec<InspectionRecord>> {
    let rope_str = rope_id.as_str().to_owned();

    let raws: Vec<RawInspection> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM inspection_logs
           WHERE rope_id = ?1
           ORDER BY inspection_date ASC, seq ASC",
          RawInspection::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![rope_str], RawInspection::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawInspection::into_record).collect()
  }

  async fn list_falls(&self, rope_id: &RopeId) -> Result<Vec<FallRecord>> {
    let rope_str = rope_id.as_str().to_owned();

    let raws: Vec<RawFall> = self
      .conn
      .call(move |conn| {
        // NULL fall_time sorts first in SQLite's ascending order.
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM fall_logs
           WHERE rope_id = ?1
           ORDER BY fall_date ASC, fall_time ASC, seq ASC",
          RawFall::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![rope_str], RawFall::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFall::into_record).collect()
  }

  async fn latest_inspection(&self, rope_id: &RopeId) -> Result<Option<InspectionRecord>> {
    let rope_str = rope_id.as_str().to_owned();

    let raw: Option<RawInspection> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM inspection_logs
                 WHERE rope_id = ?1
                 ORDER BY inspection_date DESC, seq DESC
                 LIMIT 1",
                RawInspection::COLUMNS
              ),
              rusqlite::params![rope_str],
              RawInspection::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawInspection::into_record).transpose()
  }

  async fn falls_on_or_after(
    &self,
    rope_id: &RopeId,
    since:   NaiveDate,
  ) -> Result<Vec<FallRecord>> {
    let rope_str  = rope_id.as_str().to_owned();
    let since_str = encode_date(since);

    let raws: Vec<RawFall> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM fall_logs
           WHERE rope_id = ?1
             AND fall_date >= ?2",
          RawFall::COLUMNS
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![rope_str, since_str], RawFall::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFall::into_record).collect()
  }
}
