//! SQL schema for the revtrack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Revision events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS revision_events (
    event_id                   TEXT PRIMARY KEY,
    record_id                  TEXT NOT NULL,
    event_type                 TEXT NOT NULL,   -- 'submitted' | 'received'
    revision_label             TEXT,
    event_timestamp            TEXT NOT NULL,   -- ISO 8601 UTC
    estimated_return_timestamp TEXT,            -- submissions only
    notes                      TEXT,
    actor                      TEXT,
    appended_at                TEXT NOT NULL    -- store clock; never changes
);

CREATE INDEX IF NOT EXISTS revision_events_record_idx ON revision_events(record_id);
CREATE INDEX IF NOT EXISTS revision_events_ts_idx     ON revision_events(event_timestamp);

PRAGMA user_version = 1;
";
