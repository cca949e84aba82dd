//! [`SqliteStore`] — the SQLite implementation of [`EventStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use revtrack_core::{
  event::{NewRevisionEvent, RawRevisionEvent, RevisionEvent},
  store::EventStore,
};

use crate::{
  Result,
  encode::{RawEventRow, decode_uuid, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A revision-event log backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
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

  /// Insert a fully-built [`RevisionEvent`] into `revision_events`.
  async fn insert_event(&self, event: &RevisionEvent) -> Result<()> {
    let event_id_str     = encode_uuid(event.id);
    let record_id_str    = encode_uuid(event.record_id);
    let event_type       = event.event_type.discriminant().to_owned();
    let revision_label   = event.revision_label.clone();
    let timestamp_str    = encode_dt(event.event_timestamp);
    let estimate_str     = event.estimated_return_timestamp.map(encode_dt);
    let notes            = event.notes.clone();
    let actor            = event.actor.clone();
    let appended_at_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO revision_events (
             event_id, record_id, event_type, revision_label, event_timestamp,
             estimated_return_timestamp, notes, actor, appended_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            event_id_str,
            record_id_str,
            event_type,
            revision_label,
            timestamp_str,
            estimate_str,
            notes,
            actor,
            appended_at_str,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = crate::Error;

  async fn append_event(&self, input: NewRevisionEvent) -> Result<RevisionEvent> {
    let event = input.into_event(Uuid::new_v4(), Utc::now());
    self.insert_event(&event).await?;
    tracing::debug!(
      record_id = %event.record_id,
      event_id = %event.id,
      event_type = %event.event_type,
      "appended revision event"
    );
    Ok(event)
  }

  async fn list_events(&self, record_id: Uuid) -> Result<Vec<RawRevisionEvent>> {
    let record_id_str = encode_uuid(record_id);

    let rows: Vec<RawEventRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM revision_events WHERE record_id = ?1
           ORDER BY appended_at, rowid",
          RawEventRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![record_id_str], RawEventRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    // A row whose primary key does not decode cannot be identified at all;
    // skip it and keep the rest of the record readable.
    let events: Vec<RawRevisionEvent> = rows
      .into_iter()
      .filter_map(|row| {
        let event_id = row.event_id.clone();
        match row.into_raw_event() {
          Ok(raw) => Some(raw),
          Err(e) => {
            tracing::warn!(%record_id, event_id = %event_id, error = %e, "skipping undecodable row");
            None
          }
        }
      })
      .collect();
    Ok(events)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<RevisionEvent>> {
    let id_str = encode_uuid(id);

    let row: Option<RawEventRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM revision_events WHERE event_id = ?1",
          RawEventRow::COLUMNS
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawEventRow::from_row)
            .optional()?,
        )
      })
      .await?;

    match row {
      Some(r) => Ok(Some(RevisionEvent::try_from(r.into_raw_event()?)?)),
      None => Ok(None),
    }
  }

  async fn list_records(&self) -> Result<Vec<Uuid>> {
    let ids: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT record_id FROM revision_events
           GROUP BY record_id
           ORDER BY MIN(appended_at), record_id",
        )?;
        let ids = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
      })
      .await?;

    let records: Vec<Uuid> = ids
      .iter()
      .filter_map(|s| match decode_uuid(s) {
        Ok(id) => Some(id),
        Err(e) => {
          tracing::warn!(record_id = %s, error = %e, "skipping undecodable record id");
          None
        }
      })
      .collect();
    Ok(records)
  }
}
