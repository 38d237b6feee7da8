//! SQL schema for the ropewatch SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Ropes are created once and never updated.
CREATE TABLE IF NOT EXISTS ropes (
    rope_id                TEXT PRIMARY KEY,
    product_name           TEXT NOT NULL,
    thickness              TEXT NOT NULL,
    original_length        TEXT NOT NULL,
    color                  TEXT NOT NULL,
    batch                  TEXT NOT NULL,
    manufacturing_date     TEXT,            -- YYYY-MM-DD
    purchase_date          TEXT,            -- YYYY-MM-DD; seeds status
    customer_password_hash TEXT,            -- argon2 PHC string
    created_at             TEXT NOT NULL    -- RFC 3339 UTC; server-assigned
);

-- Both event logs are strictly append-only.
-- No UPDATE or DELETE is ever issued against them.
-- `seq` is the insertion order and breaks same-date ties.
CREATE TABLE IF NOT EXISTS inspection_logs (
    seq             INTEGER PRIMARY KEY AUTOINCREMENT,
    inspection_id   TEXT NOT NULL UNIQUE,
    rope_id         TEXT NOT NULL REFERENCES ropes(rope_id),
    inspection_date TEXT NOT NULL,   -- YYYY-MM-DD
    inspected_by    TEXT NOT NULL,
    verdict         TEXT NOT NULL CHECK (verdict IN ('pass', 'fail')),
    comment         TEXT,
    image_url       TEXT,
    recorded_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS fall_logs (
    seq         INTEGER PRIMARY KEY AUTOINCREMENT,
    fall_id     TEXT NOT NULL UNIQUE,
    rope_id     TEXT NOT NULL REFERENCES ropes(rope_id),
    fall_date   TEXT NOT NULL,       -- YYYY-MM-DD
    fall_time   TEXT,                -- HH:MM:SS or NULL
    recorded_by TEXT NOT NULL,
    fall_type   TEXT NOT NULL CHECK (fall_type IN ('major', 'minor')),
    comment     TEXT,
    image_url   TEXT,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS inspection_logs_rope_date_idx
    ON inspection_logs(rope_id, inspection_date);
CREATE INDEX IF NOT EXISTS fall_logs_rope_date_idx
    ON fall_logs(rope_id, fall_date);

PRAGMA user_version = 1;
";
