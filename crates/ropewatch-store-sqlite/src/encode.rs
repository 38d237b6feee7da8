//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`, which sorts lexicographically
//! in date order, so range predicates work on the raw column. Timestamps are
//! RFC 3339 strings. Enumerations are stored as their lowercase names and
//! re-parsed through the core parsers on the way out.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use ropewatch_core::{
  event::{FallRecord, FallType, InspectionRecord, Verdict},
  rope::{Rope, RopeId},
};
use uuid::Uuid;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_time(t: NaiveTime) -> String { t.format(TIME_FORMAT).to_string() }

/// Accepts `HH:MM:SS` and the `HH:MM` form browsers submit.
pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, TIME_FORMAT)
    .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `ropes` row.
pub struct RawRope {
  pub rope_id:            String,
  pub product_name:       String,
  pub thickness:          String,
  pub original_length:    String,
  pub color:              String,
  pub batch:              String,
  pub manufacturing_date: Option<String>,
  pub purchase_date:      Option<String>,
  pub created_at:         String,
}

impl RawRope {
  pub const COLUMNS: &'static str = "rope_id, product_name, thickness, \
     original_length, color, batch, manufacturing_date, purchase_date, \
     created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      rope_id:            row.get(0)?,
      product_name:       row.get(1)?,
      thickness:          row.get(2)?,
      original_length:    row.get(3)?,
      color:              row.get(4)?,
      batch:              row.get(5)?,
      manufacturing_date: row.get(6)?,
      purchase_date:      row.get(7)?,
      created_at:         row.get(8)?,
    })
  }

  pub fn into_rope(self) -> Result<Rope> {
    Ok(Rope {
      rope_id:            RopeId::parse(&self.rope_id)?,
      product_name:       self.product_name,
      thickness:          self.thickness,
      original_length:    self.original_length,
      color:              self.color,
      batch:              self.batch,
      manufacturing_date: decode_opt_date(self.manufacturing_date)?,
      purchase_date:      decode_opt_date(self.purchase_date)?,
      created_at:         decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `inspection_logs` row.
pub struct RawInspection {
  pub seq:             i64,
  pub inspection_id:   String,
  pub rope_id:         String,
  pub inspection_date: String,
  pub inspected_by:    String,
  pub verdict:         String,
  pub comment:         Option<String>,
  pub image_url:       Option<String>,
  pub recorded_at:     String,
}

impl RawInspection {
  pub const COLUMNS: &'static str = "seq, inspection_id, rope_id, \
     inspection_date, inspected_by, verdict, comment, image_url, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:             row.get(0)?,
      inspection_id:   row.get(1)?,
      rope_id:         row.get(2)?,
      inspection_date: row.get(3)?,
      inspected_by:    row.get(4)?,
      verdict:         row.get(5)?,
      comment:         row.get(6)?,
      image_url:       row.get(7)?,
      recorded_at:     row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<InspectionRecord> {
    Ok(InspectionRecord {
      inspection_id:   decode_uuid(&self.inspection_id)?,
      rope_id:         RopeId::parse(&self.rope_id)?,
      inspection_date: decode_date(&self.inspection_date)?,
      inspected_by:    self.inspected_by,
      verdict:         Verdict::parse(&self.verdict)?,
      comment:         self.comment,
      image_url:       self.image_url,
      recorded_at:     decode_dt(&self.recorded_at)?,
      seq:             self.seq,
    })
  }
}

/// Raw strings read directly from a `fall_logs` row.
pub struct RawFall {
  pub seq:         i64,
  pub fall_id:     String,
  pub rope_id:     String,
  pub fall_date:   String,
  pub fall_time:   Option<String>,
  pub recorded_by: String,
  pub fall_type:   String,
  pub comment:     Option<String>,
  pub image_url:   Option<String>,
  pub recorded_at: String,
}

impl RawFall {
  pub const COLUMNS: &'static str = "seq, fall_id, rope_id, fall_date, \
     fall_time, recorded_by, fall_type, comment, image_url, recorded_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      seq:         row.get(0)?,
      fall_id:     row.get(1)?,
      rope_id:     row.get(2)?,
      fall_date:   row.get(3)?,
      fall_time:   row.get(4)?,
      recorded_by: row.get(5)?,
      fall_type:   row.get(6)?,
      comment:     row.get(7)?,
      image_url:   row.get(8)?,
      recorded_at: row.get(9)?,
    })
  }

  pub fn into_record(self) -> Result<FallRecord> {
    Ok(FallRecord {
      fall_id:     decode_uuid(&self.fall_id)?,
      rope_id:     RopeId::parse(&self.rope_id)?,
      fall_date:   decode_date(&self.fall_date)?,
      fall_time:   self.fall_time.as_deref().map(decode_time).transpose()?,
      recorded_by: self.recorded_by,
      fall_type:   FallType::parse(&self.fall_type)?,
      comment:     self.comment,
      image_url:   self.image_url,
      recorded_at: decode_dt(&self.recorded_at)?,
      seq:         self.seq,
    })
  }
}
