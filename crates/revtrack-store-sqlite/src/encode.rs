//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Event types are stored as their lowercase
//! discriminant.

use chrono::{DateTime, Utc};
use revtrack_core::event::RawRevisionEvent;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Decode a column that the event log may tolerate losing.
fn decode_lenient<T>(
  column: &str,
  value: Option<&str>,
  decode: impl Fn(&str) -> Result<T>,
) -> Option<T> {
  let value = value?;
  match decode(value) {
    Ok(v) => Some(v),
    Err(e) => {
      tracing::warn!(column, value, error = %e, "undecodable column");
      None
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `revision_events` row.
pub struct RawEventRow {
  pub event_id:                   String,
  pub record_id:                  String,
  pub event_type:                 String,
  pub revision_label:             Option<String>,
  pub event_timestamp:            String,
  pub estimated_return_timestamp: Option<String>,
  pub notes:                      Option<String>,
  pub actor:                      Option<String>,
}

impl RawEventRow {
  pub const COLUMNS: &'static str = "event_id, record_id, event_type, \
     revision_label, event_timestamp, estimated_return_timestamp, notes, actor";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:                   row.get(0)?,
      record_id:                  row.get(1)?,
      event_type:                 row.get(2)?,
      revision_label:             row.get(3)?,
      event_timestamp:            row.get(4)?,
      estimated_return_timestamp: row.get(5)?,
      notes:                      row.get(6)?,
      actor:                      row.get(7)?,
    })
  }

  /// Decode into a [`RawRevisionEvent`]. Only the primary key must decode;
  /// any other column that fails is left unset for the event log to judge.
  pub fn into_raw_event(self) -> Result<RawRevisionEvent> {
    Ok(RawRevisionEvent {
      id:                         decode_uuid(&self.event_id)?,
      record_id:                  decode_lenient(
        "record_id",
        Some(&self.record_id),
        decode_uuid,
      ),
      event_type:                 Some(self.event_type),
      revision_label:             self.revision_label,
      event_timestamp:            decode_lenient(
        "event_timestamp",
        Some(&self.event_timestamp),
        decode_dt,
      ),
      estimated_return_timestamp: decode_lenient(
        "estimated_return_timestamp",
        self.estimated_return_timestamp.as_deref(),
        decode_dt,
      ),
      notes:                      self.notes,
      actor:                      self.actor,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn row() -> RawEventRow {
    RawEventRow {
      event_id:                   encode_uuid(Uuid::new_v4()),
      record_id:                  encode_uuid(Uuid::new_v4()),
      event_type:                 "submitted".into(),
      revision_label:             Some("Rev-01".into()),
      event_timestamp:            "2024-01-01T00:00:00+00:00".into(),
      estimated_return_timestamp: None,
      notes:                      None,
      actor:                      None,
    }
  }

  #[test]
  fn dt_roundtrip() {
    let dt = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }

  #[test]
  fn bad_timestamp_is_left_unset() {
    let mut r = row();
    r.event_timestamp = "not a date".into();
    let raw = r.into_raw_event().unwrap();
    assert_eq!(raw.event_timestamp, None);
    assert!(raw.record_id.is_some());
  }

  #[test]
  fn bad_primary_key_is_an_error() {
    let mut r = row();
    r.event_id = "nope".into();
    assert!(matches!(r.into_raw_event(), Err(Error::Uuid(_))));
  }
}
