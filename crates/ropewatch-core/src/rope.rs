//! Rope — the physical item whose safety lifecycle is tracked.
//!
//! A rope is created once by an administrator and never updated. Everything
//! that happens to it afterwards is recorded as an inspection or a fall
//! event (see [`crate::event`]).

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Characters a generated rope id is drawn from.
pub const ROPE_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated rope id.
pub const ROPE_ID_LEN: usize = 10;

/// Opaque token identifying a rope, typically written to its NFC tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RopeId(String);

impl RopeId {
  /// Accept an externally supplied token. Only empty tokens are rejected;
  /// ids minted before the current alphabet was fixed stay valid.
  pub fn parse(token: &str) -> Result<Self> {
    let token = token.trim();
    if token.is_empty() {
      return Err(Error::InvalidRopeId(token.to_owned()));
    }
    Ok(Self(token.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for RopeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Rope ────────────────────────────────────────────────────────────────────

/// A rope as stored. Product fields are free text, exactly as printed on
/// the manufacturer's label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rope {
  pub rope_id:            RopeId,
  pub product_name:       String,
  pub thickness:          String,
  pub original_length:    String,
  pub color:              String,
  pub batch:              String,
  pub manufacturing_date: Option<NaiveDate>,
  /// Seeds the status computation until the first inspection exists.
  pub purchase_date:      Option<NaiveDate>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:         DateTime<Utc>,
}

/// Input to [`crate::store::RopeStore::create_rope`]. The id and
/// `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRope {
  pub product_name:           String,
  pub thickness:              String,
  pub original_length:        String,
  pub color:                  String,
  pub batch:                  String,
  pub manufacturing_date:     Option<NaiveDate>,
  pub purchase_date:          Option<NaiveDate>,
  /// Argon2 PHC string for the customer's password. Stored, never read back.
  pub customer_password_hash: Option<String>,
}
